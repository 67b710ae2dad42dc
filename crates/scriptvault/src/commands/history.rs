//! One-shot history commands.
//!
//! These go through the same dispatcher and request gate as the server, so
//! a CLI call validates and answers exactly like an HTTP request would.

use anyhow::Context;
use scriptvault_core::{Config, Dispatcher, RequestGate, RequestParams, Response};
use scriptvault_provider::AppsScriptClient;
use scriptvault_snapshot::SnapshotStore;
use scriptvault_storage::JsonStorage;
use std::sync::Arc;

/// Which project log a command works on.
pub struct HistoryTarget {
    pub project_id: Option<String>,
    pub container_id: Option<String>,
}

/// Build a dispatcher over the JSON document store and the Apps Script API.
pub fn build_dispatcher(
    config: &Config,
    public_url: String,
) -> anyhow::Result<Dispatcher<JsonStorage>> {
    let token = config.provider_token().context(
        "No provider token configured. Set provider.token in the config or SCRIPTVAULT_TOKEN",
    )?;
    let provider = AppsScriptClient::with_base_url(token, config.provider_base_url())?;
    let storage = JsonStorage::new(config.store_dir()?);
    tracing::debug!(path = %storage.base_path().display(), "Using document store");

    let store = SnapshotStore::new(Arc::new(storage), Arc::new(provider));
    let gate = Arc::new(RequestGate::new(config.lock_timeout()));
    Ok(Dispatcher::new(
        store,
        gate,
        config.default_container(),
        public_url,
    ))
}

/// Run one request and print its response.
pub async fn run_request(
    config: &Config,
    target: HistoryTarget,
    params: RequestParams,
) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(config, config.public_url())?;
    let params = RequestParams {
        project_id: target.project_id,
        container_id: target.container_id,
        ..params
    };

    let response = dispatcher.handle(params).await?;
    print_response(&response)
}

fn print_response(response: &Response) -> anyhow::Result<()> {
    match response {
        Response::Text(text) | Response::Markup(text) => println!("{text}"),
        Response::Snapshots(snapshots) => {
            println!("{}", serde_json::to_string_pretty(snapshots)?)
        }
        Response::Link { message, .. } => println!("{message}"),
    }
    Ok(())
}
