//! In-memory content provider for testing.

use crate::{ContentProvider, ProviderError, ProviderResult, SourceFile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const NOT_FOUND_BODY: &str =
    r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;

/// Mock provider holding the live content of each project in memory.
///
/// Failures can be queued for the next fetch or push; a queued failure is
/// consumed by the call it fails.
#[derive(Debug, Default)]
pub struct MockContentProvider {
    projects: Mutex<HashMap<String, Vec<SourceFile>>>,
    fetch_failure: Mutex<Option<(u16, String)>>,
    push_failure: Mutex<Option<(u16, String)>>,
    fetches: AtomicUsize,
    pushes: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project with content.
    pub fn with_project(self, project_id: impl Into<String>, files: Vec<SourceFile>) -> Self {
        self.set_content(project_id, files);
        self
    }

    /// Replace a project's live content, as an editor would.
    pub fn set_content(&self, project_id: impl Into<String>, files: Vec<SourceFile>) {
        lock(&self.projects).insert(project_id.into(), files);
    }

    /// Current live content of a project.
    pub fn content(&self, project_id: &str) -> Option<Vec<SourceFile>> {
        lock(&self.projects).get(project_id).cloned()
    }

    /// Make the next fetch fail with the given status and body.
    pub fn fail_next_fetch(&self, status: u16, body: impl Into<String>) {
        *lock(&self.fetch_failure) = Some((status, body.into()));
    }

    /// Make the next push fail with the given status and body.
    pub fn fail_next_push(&self, status: u16, body: impl Into<String>) {
        *lock(&self.push_failure) = Some((status, body.into()));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for MockContentProvider {
    async fn fetch(&self, project_id: &str) -> ProviderResult<Vec<SourceFile>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some((status, body)) = lock(&self.fetch_failure).take() {
            return Err(ProviderError::remote(status, body));
        }
        self.content(project_id)
            .ok_or_else(|| ProviderError::remote(404, NOT_FOUND_BODY))
    }

    async fn push(&self, project_id: &str, files: &[SourceFile]) -> ProviderResult<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if let Some((status, body)) = lock(&self.push_failure).take() {
            return Err(ProviderError::remote(status, body));
        }
        self.set_content(project_id, files.to_vec());
        Ok(())
    }
}
