//! HTTP routes for the server.

use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use scriptvault_core::{ErrorKind, RequestParams, Response as VaultResponse, VaultError};
use scriptvault_storage::Storage;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Create the router.
///
/// `GET /` and `POST /` take the request in the query string.
pub fn create_router<S: Storage + 'static>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dispatch::<S>).post(dispatch::<S>))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `address` and serve until the process is stopped.
pub async fn serve<S: Storage + 'static>(
    state: AppState<S>,
    address: SocketAddr,
) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Server listening on http://{}", address);
    axum::serve(listener, app).await
}

/// A failed request rendered as `{"error": message}`.
enum ApiError {
    Vault(VaultError),
    /// The spawned dispatch task panicked or was cancelled.
    Aborted(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Vault(e) => match e.kind() {
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Remote => StatusCode::BAD_GATEWAY,
                ErrorKind::LockTimeout => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Storage | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Aborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VaultError> for ApiError {
    fn from(e: VaultError) -> Self {
        ApiError::Vault(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let payload = match self {
            ApiError::Vault(e) => {
                if status.is_server_error() {
                    warn!(kind = e.kind().as_str(), error = %e, "Request failed");
                }
                e.payload()
            }
            ApiError::Aborted(message) => {
                warn!(error = %message, "Dispatch task aborted");
                serde_json::json!({ "error": message })
            }
        };
        (status, Json(payload)).into_response()
    }
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn dispatch<S: Storage + 'static>(
    State(state): State<AppState<S>>,
    query: Result<Query<RequestParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) =
        query.map_err(|e| ApiError::from(VaultError::invalid_request(e.body_text())))?;

    // Run detached so a dropped connection cannot cancel a write holding the gate.
    let dispatcher = state.dispatcher.clone();
    let response = tokio::spawn(async move { dispatcher.handle(params).await })
        .await
        .map_err(|e| ApiError::Aborted(e.to_string()))??;

    Ok(match response {
        VaultResponse::Text(text) => text.into_response(),
        VaultResponse::Snapshots(snapshots) => Json(snapshots).into_response(),
        VaultResponse::Markup(html) => Html(html).into_response(),
        VaultResponse::Link { message, url } => {
            Json(serde_json::json!({ "message": message, "url": url })).into_response()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use scriptvault_core::{Dispatcher, RequestGate};
    use async_trait::async_trait;
    use scriptvault_provider::{ContentProvider, MockContentProvider, ProviderResult, SourceFile};
    use scriptvault_snapshot::SnapshotStore;
    use scriptvault_storage::MemoryStorage;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with_wait(wait: Duration) -> (Arc<MockContentProvider>, AppState<MemoryStorage>) {
        let provider = Arc::new(
            MockContentProvider::new()
                .with_project("proj", vec![SourceFile::script("Code", "function hello() {}")]),
        );
        let store = SnapshotStore::new(Arc::new(MemoryStorage::new()), provider.clone());
        let dispatcher = Dispatcher::new(
            store,
            Arc::new(RequestGate::new(wait)),
            "root",
            "http://vault.test",
        );
        (provider, AppState::new(dispatcher))
    }

    /// Provider whose fetch takes a while to answer.
    struct SlowProvider {
        inner: MockContentProvider,
        delay: Duration,
    }

    #[async_trait]
    impl ContentProvider for SlowProvider {
        async fn fetch(&self, project_id: &str) -> ProviderResult<Vec<SourceFile>> {
            tokio::time::sleep(self.delay).await;
            self.inner.fetch(project_id).await
        }

        async fn push(&self, project_id: &str, files: &[SourceFile]) -> ProviderResult<()> {
            self.inner.push(project_id, files).await
        }
    }

        fn app() -> (Arc<MockContentProvider>, AppState<MemoryStorage>) {
        app_with_wait(Duration::from_secs(1))
    }

    async fn call(state: &AppState<MemoryStorage>, method: &str, uri: &str) -> (StatusCode, String, String) {
        let response = create_router(state.clone())
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (_, state) = app();
        let (status, _, body) = call(&state, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"healthy\":true"));
    }

    #[tokio::test]
    async fn test_missing_project_is_bad_request() {
        let (_, state) = app();
        let (status, content_type, body) = call(&state, "GET", "/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(content_type.starts_with("application/json"));
        assert_eq!(body, r#"{"error":"No script ID."}"#);
    }

    #[tokio::test]
    async fn test_store_then_list_json() {
        let (_, state) = app();
        let (status, content_type, body) =
            call(&state, "POST", "/?scriptId=proj&process=store").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain"));
        assert!(body.starts_with("Save as "));

        let (status, _, body) = call(&state, "GET", "/?projectId=proj&asJSON=true").await;
        assert_eq!(status, StatusCode::OK);
        let log: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(log.as_array().unwrap().len(), 1);
        assert_eq!(log[0]["files"][0]["kind"], "SERVER_JS");
    }

    #[tokio::test]
    async fn test_list_markup_and_link() {
        let (_, state) = app();
        let (_, content_type, body) =
            call(&state, "GET", "/?projectId=proj&asMarkup=true").await;
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("No histories."));

        let (status, _, body) = call(&state, "GET", "/?projectId=proj").await;
        assert_eq!(status, StatusCode::OK);
        let link: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(link["url"]
            .as_str()
            .unwrap()
            .starts_with("http://vault.test/?operation=list"));
    }

    #[tokio::test]
    async fn test_revert_unknown_is_not_found() {
        let (_, state) = app();
        let (status, _, body) = call(
            &state,
            "POST",
            "/?projectId=proj&operation=revert&targetTimestamp=nope",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"The history of \"nope\" was not found."}"#);
    }

    #[tokio::test]
    async fn test_remote_failure_is_bad_gateway() {
        let (provider, state) = app();
        provider.fail_next_fetch(403, "forbidden");
        let (status, _, body) = call(&state, "POST", "/?projectId=proj&operation=store").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, r#"{"error":"forbidden"}"#);
    }

    #[tokio::test]
    async fn test_lock_timeout_is_unavailable() {
        let (_, state) = app_with_wait(Duration::from_millis(10));
        let _held = state.dispatcher.gate().acquire().await.unwrap();
        let (status, _, body) = call(&state, "POST", "/?projectId=proj&operation=store").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"error":"Timeout"}"#);
    }

    #[tokio::test]
    async fn test_duplicate_parameters_are_rejected() {
        let (_, state) = app();
        let (status, _, body) = call(&state, "GET", "/?projectId=a&scriptId=b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with(r#"{"error":"#));
    }

    #[tokio::test]
    async fn test_dropped_request_still_completes_store() {
        let provider = Arc::new(SlowProvider {
            inner: MockContentProvider::new()
                .with_project("proj", vec![SourceFile::script("Code", "function hello() {}")]),
            delay: Duration::from_millis(100),
        });
        let store = SnapshotStore::new(Arc::new(MemoryStorage::new()), provider);
        let state = AppState::new(Dispatcher::new(
            store,
            Arc::new(RequestGate::new(Duration::from_secs(1))),
            "root",
            "http://vault.test",
        ));

        let request = create_router(state.clone()).oneshot(
            Request::builder()
                .method("POST")
                .uri("/?projectId=proj&operation=store")
                .body(Body::empty())
                .unwrap(),
        );
        let result = tokio::time::timeout(Duration::from_millis(20), request).await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        let log = state
            .dispatcher
            .store()
            .list("proj", "root", None)
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
    }
}
