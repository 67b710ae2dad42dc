//! Provider error types.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while talking to the content provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("Provider returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// HTTP request failed before a response arrived.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The provider answered with a body we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No bearer token was configured.
    #[error("Missing access token for content provider")]
    MissingToken,

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ProviderError {
    /// Create a remote error from a status code and raw response body.
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// The raw text to hand back to the caller.
    ///
    /// For a non-success response this is the provider's body, untouched.
    pub fn body(&self) -> String {
        match self {
            ProviderError::Remote { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of the failed response, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Remote { status, .. } => Some(*status),
            ProviderError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
