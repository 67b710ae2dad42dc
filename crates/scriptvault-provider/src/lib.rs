//! Project content provider client for scriptvault.
//!
//! The provider owns the live, editable source of a project. This crate
//! reads and writes that source as a whole bundle of [`SourceFile`]s:
//! - [`AppsScriptClient`] talks to the Apps Script content API over HTTP
//! - [`MockContentProvider`] keeps project content in memory for tests
//!
//! Neither implementation retries; failures go straight back to the caller.

pub mod apps_script;
pub mod error;
pub mod file;
pub mod mock;

pub use apps_script::{AppsScriptClient, DEFAULT_BASE_URL};
pub use error::{ProviderError, ProviderResult};
pub use file::{FileKind, SourceFile};
pub use mock::MockContentProvider;

use async_trait::async_trait;

/// Read/write access to a project's full source bundle.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch the current files of a project, in provider order.
    async fn fetch(&self, project_id: &str) -> ProviderResult<Vec<SourceFile>>;

    /// Replace the project's content with `files`.
    async fn push(&self, project_id: &str, files: &[SourceFile]) -> ProviderResult<()>;
}
