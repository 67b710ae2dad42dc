//! Error types for the core crate.

use scriptvault_snapshot::SnapshotError;
use scriptvault_storage::StorageError;
use serde_json::{json, Value};
use thiserror::Error;

/// The kinds of failure a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    LockTimeout,
    Remote,
    NotFound,
    Storage,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::LockTimeout => "lock_timeout",
            ErrorKind::Remote => "remote",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage",
            ErrorKind::Config => "config",
        }
    }
}

/// Errors surfaced by request handling.
///
/// Nothing here is retried. Whatever the snapshot store already persisted
/// before the failure (a revert's safety snapshot, say) stays persisted.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Missing or malformed request fields. Reported before the gate is taken.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request gate could not be acquired in time.
    #[error("Timeout")]
    LockTimeout,

    /// The content provider rejected a fetch or push. `body` is the
    /// provider's response text, untouched.
    #[error("{body}")]
    Remote { status: Option<u16>, body: String },

    /// No snapshot carries the requested timestamp.
    #[error("The history of \"{0}\" was not found.")]
    NotFound(String),

    /// The persisted log could not be read or written.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl VaultError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            VaultError::LockTimeout => ErrorKind::LockTimeout,
            VaultError::Remote { .. } => ErrorKind::Remote,
            VaultError::NotFound(_) => ErrorKind::NotFound,
            VaultError::Storage(_) => ErrorKind::Storage,
            VaultError::Config(_) => ErrorKind::Config,
        }
    }

    /// The `{"error": message}` payload handed back to callers.
    pub fn payload(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<StorageError> for VaultError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(message) => VaultError::InvalidRequest(message),
            other => VaultError::Storage(other),
        }
    }
}

impl From<SnapshotError> for VaultError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::NotFound(timestamp) => VaultError::NotFound(timestamp),
            SnapshotError::Remote(e) => VaultError::Remote {
                status: e.status(),
                body: e.body(),
            },
            SnapshotError::Storage(e) => e.into(),
            SnapshotError::InvalidPattern(message) => {
                VaultError::InvalidRequest(format!("Invalid search pattern: {message}"))
            }
        }
    }
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON/JSONC syntax.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// Environment variable not found during substitution.
    #[error("environment variable not found: {name}")]
    EnvVarNotFound { name: String },

    /// File reference not found during substitution.
    #[error("file reference not found: {path}")]
    FileRefNotFound { path: String },

    /// A config value is unusable.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;
    use scriptvault_provider::ProviderError;

    #[test]
    fn remote_error_keeps_raw_body() {
        let body = r#"{"error":{"code":403,"message":"denied"}}"#;
        let err = VaultError::from(SnapshotError::from(ProviderError::remote(403, body)));
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), body);
        assert_eq!(err.payload(), json!({ "error": body }));
    }

    #[test]
    fn not_found_payload() {
        let err = VaultError::from(SnapshotError::not_found("2024-01-01T00:00:00.000Z"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.payload(),
            json!({ "error": "The history of \"2024-01-01T00:00:00.000Z\" was not found." })
        );
    }

    #[test]
    fn invalid_key_is_invalid_request() {
        let err = VaultError::from(StorageError::invalid_key("bad name"));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn invalid_pattern_is_invalid_request() {
        let err = VaultError::from(SnapshotError::InvalidPattern("unclosed group".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("unclosed group"));
    }

    #[test]
    fn lock_timeout_message() {
        assert_eq!(VaultError::LockTimeout.to_string(), "Timeout");
        assert_eq!(VaultError::LockTimeout.kind().as_str(), "lock_timeout");
    }
}
