//! Request parameters and their validation.
//!
//! Transports hand over a loose [`RequestParams`]; dispatch only ever sees a
//! [`RequestConfig`] that has already passed validation.

use crate::error::{VaultError, VaultResult};
use scriptvault_snapshot::SearchPattern;
use scriptvault_storage::DocumentHandle;
use serde::Deserialize;

/// Raw request parameters as they arrive from a transport.
///
/// Every field is optional. Both naming schemes are accepted, e.g.
/// `projectId` or `scriptId`, `operation` or `process`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    #[serde(rename = "projectId", alias = "scriptId")]
    pub project_id: Option<String>,

    #[serde(rename = "containerId", alias = "folderId")]
    pub container_id: Option<String>,

    #[serde(alias = "process")]
    pub operation: Option<String>,

    #[serde(rename = "targetTimestamp", alias = "load")]
    pub target_timestamp: Option<String>,

    #[serde(rename = "deleteTimestamp", alias = "deleteDate")]
    pub delete_timestamp: Option<String>,

    #[serde(rename = "searchPattern", alias = "search")]
    pub search_pattern: Option<String>,

    #[serde(rename = "asJSON", alias = "jsonOutput")]
    pub as_json: Option<String>,

    #[serde(rename = "asMarkup", alias = "htmlOutput")]
    pub as_markup: Option<String>,

    pub internal: Option<String>,
}

/// What a request does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Store,
    List,
    Revert { target: String },
    Delete { target: String },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Store => "store",
            Operation::List => "list",
            Operation::Revert { .. } => "revert",
            Operation::Delete { .. } => "delete",
        }
    }
}

/// How a list result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The snapshot sequence as JSON.
    Json,
    /// A full markup page.
    Markup,
    /// A message with a link to the markup page.
    #[default]
    Link,
}

/// A validated request.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub project_id: String,
    pub container_id: String,
    pub operation: Operation,
    /// The search text as given, kept for links back to the markup view.
    pub search_text: String,
    pub search: Option<SearchPattern>,
    pub format: OutputFormat,
    /// Answer with the markup fragment of the log after the operation.
    pub internal: bool,
}

impl RequestConfig {
    /// Validate `params`, filling in `default_container` when no container
    /// is given.
    pub fn from_params(params: RequestParams, default_container: &str) -> VaultResult<Self> {
        let project_id = non_empty(params.project_id)
            .ok_or_else(|| VaultError::invalid_request("No script ID."))?;
        let container_id =
            non_empty(params.container_id).unwrap_or_else(|| default_container.to_string());
        DocumentHandle::resolve(container_id.as_str(), project_id.as_str())?;

        let operation = match params.operation.as_deref().map(str::trim) {
            None | Some("") | Some("list") | Some("getHistories") => Operation::List,
            Some("store") => Operation::Store,
            Some("revert") | Some("loadHistory") => Operation::Revert {
                target: non_empty(params.target_timestamp).ok_or_else(|| {
                    VaultError::invalid_request("A target timestamp is required to revert.")
                })?,
            },
            Some("delete") | Some("deleteHistory") => Operation::Delete {
                target: non_empty(params.delete_timestamp).ok_or_else(|| {
                    VaultError::invalid_request("A timestamp is required to delete.")
                })?,
            },
            Some(other) => {
                return Err(VaultError::invalid_request(format!(
                    "Unknown operation: {other}"
                )))
            }
        };

        let search_text = params.search_pattern.unwrap_or_default();
        let search = SearchPattern::parse(&search_text)?;

        let format = if flag(&params.as_json) {
            OutputFormat::Json
        } else if flag(&params.as_markup) {
            OutputFormat::Markup
        } else {
            OutputFormat::Link
        };

        Ok(Self {
            project_id,
            container_id,
            operation,
            search_text,
            search,
            format,
            internal: flag(&params.internal),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn flag(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}
