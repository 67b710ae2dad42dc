//! HTTP client for the Apps Script project content API.
//!
//! `GET` and `PUT` against `{base}/v1/projects/{id}/content`, authenticated
//! with a bearer token. The response body is `{"files": [...]}` where each
//! file carries `name`, `type` and `source`.

use crate::{ContentProvider, FileKind, ProviderError, ProviderResult, SourceFile};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Public endpoint of the content API.
pub const DEFAULT_BASE_URL: &str = "https://script.googleapis.com";

/// Apps Script content API client.
#[derive(Debug, Clone)]
pub struct AppsScriptClient {
    client: Client,
    token: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    files: Vec<WireFile>,
}

#[derive(Debug, Deserialize)]
struct WireFile {
    name: String,
    #[serde(rename = "type")]
    kind: FileKind,
    #[serde(default)]
    source: String,
}

#[derive(Debug, Serialize)]
struct ContentRequest<'a> {
    files: Vec<WireFileRef<'a>>,
}

#[derive(Debug, Serialize)]
struct WireFileRef<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: FileKind,
    source: &'a str,
}

impl From<WireFile> for SourceFile {
    fn from(file: WireFile) -> Self {
        SourceFile::new(file.name, file.kind, file.source)
    }
}

impl<'a> From<&'a SourceFile> for WireFileRef<'a> {
    fn from(file: &'a SourceFile) -> Self {
        Self {
            name: &file.name,
            kind: file.kind,
            source: &file.source,
        }
    }
}

impl AppsScriptClient {
    /// Create a client against the public endpoint.
    pub fn new(token: impl Into<String>) -> ProviderResult<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> ProviderResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProviderError::MissingToken);
        }

        let base_url =
            Url::parse(base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("scriptvault/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            token,
            base_url,
        })
    }

    /// URL of a project's content resource.
    fn content_url(&self, project_id: &str) -> ProviderResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v1", "projects", project_id, "content"]);
        Ok(url)
    }

    /// Turn a non-success response into a [`ProviderError::Remote`] carrying
    /// the raw body.
    async fn check(response: Response, action: &str, project_id: &str) -> ProviderResult<String> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                project = project_id,
                status = status.as_u16(),
                body = %body,
                "Content provider {} failed",
                action
            );
            return Err(ProviderError::remote(status.as_u16(), body));
        }

        Ok(body)
    }
}

#[async_trait]
impl ContentProvider for AppsScriptClient {
    async fn fetch(&self, project_id: &str) -> ProviderResult<Vec<SourceFile>> {
        let url = self.content_url(project_id)?;
        debug!(url = %url, "Fetching project content");

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        let body = Self::check(response, "fetch", project_id).await?;
        let content: ContentResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(e.to_string()))?;

        debug!(
            project = project_id,
            files = content.files.len(),
            "Fetched project content"
        );
        for file in &content.files {
            trace!(
                project = project_id,
                name = %file.name,
                kind = file.kind.as_str(),
                bytes = file.source.len(),
                "Fetched file"
            );
        }
        Ok(content.files.into_iter().map(SourceFile::from).collect())
    }

    async fn push(&self, project_id: &str, files: &[SourceFile]) -> ProviderResult<()> {
        let url = self.content_url(project_id)?;
        debug!(url = %url, files = files.len(), "Pushing project content");

        let payload = ContentRequest {
            files: files.iter().map(WireFileRef::from).collect(),
        };

        let response = self
            .client
            .put(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&payload)
            .send()
            .await?;

        Self::check(response, "push", project_id).await?;
        Ok(())
    }
}
