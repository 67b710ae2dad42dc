//! Document storage for scriptvault.
//!
//! Each project's snapshot log lives in one document, addressed by a
//! [`DocumentHandle`] (container + name). Two backends are provided:
//! - JSON file storage (default)
//! - In-memory storage (for testing)

pub mod error;
pub mod handle;
pub mod json;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use handle::DocumentHandle;
pub use json::JsonStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// A trait for document storage backends.
///
/// Keys are path segments, e.g. `["root", "1AbCdEf"]`. Values are stored as
/// JSON. A document that is missing, empty, or whitespace-only reads as `None`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read and deserialize a document.
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>>;

    /// Overwrite a document with the serialized value.
    ///
    /// The document (and any parent container) is created if absent.
    async fn write<T: Serialize + Send + Sync>(&self, key: &[&str], value: &T)
        -> StorageResult<()>;

    /// Read the document text verbatim.
    async fn raw(&self, key: &[&str]) -> StorageResult<Option<String>>;

    /// Check if a document exists.
    async fn exists(&self, key: &[&str]) -> StorageResult<bool>;
}

/// Deserialize document text, treating blank documents as absent.
pub(crate) fn decode<T: DeserializeOwned>(content: &str) -> StorageResult<Option<T>> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(content)?))
}
