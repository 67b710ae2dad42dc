//! Snapshot history for scriptvault.
//!
//! A project's history is an append-only [`SnapshotLog`] persisted as one
//! JSON document. The [`SnapshotStore`] layers the user-facing operations on
//! top of it:
//! - `store`: capture the provider's current content and append it
//! - `list`: read the log, optionally filtered by a source pattern
//! - `revert`: capture a safety snapshot, then push an older snapshot back
//! - `delete`: drop snapshots with a given timestamp
//!
//! # Example
//!
//! ```no_run
//! use scriptvault_provider::AppsScriptClient;
//! use scriptvault_snapshot::SnapshotStore;
//! use scriptvault_storage::JsonStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(JsonStorage::new("/var/lib/scriptvault"));
//! let provider = Arc::new(AppsScriptClient::new("ya29.token")?);
//! let store = SnapshotStore::new(storage, provider);
//!
//! let snapshot = store.store("1AbCdEf", "root").await?;
//! store.revert("1AbCdEf", "root", &snapshot.timestamp).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod log;
mod snapshot;
mod store;

pub use error::{SnapshotError, SnapshotResult};
pub use log::{search, SearchPattern, SnapshotLog};
pub use snapshot::{format_timestamp, next_timestamp, Snapshot};
pub use store::{Reverted, SnapshotStore};
