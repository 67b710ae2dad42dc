//! Request dispatch.

use crate::error::VaultResult;
use crate::gate::RequestGate;
use crate::render;
use crate::request::{Operation, OutputFormat, RequestConfig, RequestParams};
use scriptvault_snapshot::{Snapshot, SnapshotStore};
use scriptvault_storage::Storage;
use scriptvault_util::TimingGuard;
use serde::Serialize;
use std::sync::Arc;

/// What a handled request produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// A confirmation such as `Save as <timestamp>` or `Done.`.
    Text(String),
    /// The (filtered) snapshot log.
    Snapshots(Vec<Snapshot>),
    /// A markup page or fragment.
    Markup(String),
    /// Where to look at the markup view.
    Link { message: String, url: String },
}

/// Validates requests and runs them against the snapshot store under the
/// request gate.
pub struct Dispatcher<S> {
    store: SnapshotStore<S>,
    gate: Arc<RequestGate>,
    default_container: String,
    public_url: String,
}

impl<S: Storage> Dispatcher<S> {
    pub fn new(
        store: SnapshotStore<S>,
        gate: Arc<RequestGate>,
        default_container: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gate,
            default_container: default_container.into(),
            public_url: public_url.into(),
        }
    }

    pub fn gate(&self) -> &Arc<RequestGate> {
        &self.gate
    }

    pub fn store(&self) -> &SnapshotStore<S> {
        &self.store
    }

    /// Validate `params` and execute them.
    ///
    /// Invalid requests fail before the gate is touched.
    pub async fn handle(&self, params: RequestParams) -> VaultResult<Response> {
        let request = RequestConfig::from_params(params, &self.default_container)?;
        self.execute(&request).await
    }

    /// Execute a validated request while holding the gate.
    pub async fn execute(&self, request: &RequestConfig) -> VaultResult<Response> {
        let _timing = TimingGuard::request(request.operation.name());
        self.gate.run(self.run(request)).await
    }

    async fn run(&self, request: &RequestConfig) -> VaultResult<Response> {
        let project = request.project_id.as_str();
        let container = request.container_id.as_str();

        let response = match &request.operation {
            Operation::Store => {
                let snapshot = self.store.store(project, container).await?;
                Response::Text(format!("Save as {}", snapshot.timestamp))
            }
            Operation::List if request.internal => return self.fragment(request).await,
            Operation::List => self.list(request).await?,
            Operation::Revert { target } => {
                self.store.revert(project, container, target).await?;
                Response::Text("Done.".to_string())
            }
            Operation::Delete { target } => {
                self.store.delete(project, container, target).await?;
                Response::Text("Done.".to_string())
            }
        };

        if request.internal {
            return self.fragment(request).await;
        }
        Ok(response)
    }

    async fn list(&self, request: &RequestConfig) -> VaultResult<Response> {
        Ok(match request.format {
            OutputFormat::Json => Response::Snapshots(self.snapshots(request).await?),
            OutputFormat::Markup => {
                let snapshots = self.snapshots(request).await?;
                Response::Markup(render::page(
                    &request.project_id,
                    &request.container_id,
                    &request.search_text,
                    &render::fragment(&snapshots),
                ))
            }
            OutputFormat::Link => {
                let url = render::list_url(&self.public_url, request)?;
                Response::Link {
                    message: render::link_message(&url),
                    url,
                }
            }
        })
    }

    async fn fragment(&self, request: &RequestConfig) -> VaultResult<Response> {
        let snapshots = self.snapshots(request).await?;
        Ok(Response::Markup(render::fragment(&snapshots)))
    }

    async fn snapshots(&self, request: &RequestConfig) -> VaultResult<Vec<Snapshot>> {
        Ok(self
            .store
            .list(
                &request.project_id,
                &request.container_id,
                request.search.as_ref(),
            )
            .await?)
    }
}
