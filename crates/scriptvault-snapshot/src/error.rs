//! Snapshot error types.

use scriptvault_provider::ProviderError;
use scriptvault_storage::StorageError;
use thiserror::Error;

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No snapshot with the requested timestamp.
    #[error("The history of \"{0}\" was not found.")]
    NotFound(String),

    /// The content provider rejected a fetch or push.
    #[error(transparent)]
    Remote(#[from] ProviderError),

    /// The persisted log could not be read or written.
    #[error("Snapshot storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The search pattern is not a valid regular expression.
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),
}

impl SnapshotError {
    /// Create a not found error.
    pub fn not_found(timestamp: impl Into<String>) -> Self {
        Self::NotFound(timestamp.into())
    }
}
