//! Snapshot operations over the log and the content provider.

use crate::{SearchPattern, Snapshot, SnapshotError, SnapshotLog, SnapshotResult};
use scriptvault_provider::ContentProvider;
use scriptvault_storage::{DocumentHandle, Storage};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reverted {
    /// Capture of the provider's content taken just before the revert.
    pub safety: Snapshot,
    /// The snapshot whose files were pushed back.
    pub restored: Snapshot,
}

/// Store, list, revert and delete snapshots of provider projects.
///
/// Every mutating operation is a full load, transform, save cycle on the
/// project's log. The store does no locking of its own; run operations one
/// at a time (see the request gate in `scriptvault-core`).
pub struct SnapshotStore<S> {
    log: SnapshotLog<S>,
    provider: Arc<dyn ContentProvider>,
}

impl<S: Storage> SnapshotStore<S> {
    pub fn new(storage: Arc<S>, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            log: SnapshotLog::new(storage),
            provider,
        }
    }

    /// The underlying log.
    pub fn log(&self) -> &SnapshotLog<S> {
        &self.log
    }

    /// Capture the provider's current content and append it to the log.
    ///
    /// If the fetch fails the log is not touched.
    pub async fn store(&self, project_id: &str, container_id: &str) -> SnapshotResult<Snapshot> {
        let handle = DocumentHandle::resolve(container_id, project_id)?;

        let files = self.provider.fetch(project_id).await.inspect_err(|e| {
            warn!(project = project_id, error = %e, "Fetch failed; log unchanged");
        })?;

        let mut snapshots = self.log.load(&handle).await?;
        let snapshot = Snapshot::capture(files, snapshots.last());
        snapshots.push(snapshot.clone());
        self.log.save(&handle, &snapshots).await?;

        info!(
            project = project_id,
            container = container_id,
            timestamp = %snapshot.timestamp,
            files = snapshot.files.len(),
            "Stored snapshot"
        );
        Ok(snapshot)
    }

    /// The project's snapshots in append order, optionally filtered.
    pub async fn list(
        &self,
        project_id: &str,
        container_id: &str,
        pattern: Option<&SearchPattern>,
    ) -> SnapshotResult<Vec<Snapshot>> {
        let handle = DocumentHandle::resolve(container_id, project_id)?;
        let snapshots = self.log.load(&handle).await?;
        Ok(match pattern {
            Some(pattern) => pattern.filter(snapshots),
            None => snapshots,
        })
    }

    /// Push the files of the snapshot stamped `target` back to the provider.
    ///
    /// A safety snapshot of the current content is stored first and kept
    /// whatever happens next, so every revert can itself be undone. If the
    /// safety capture fails nothing is pushed.
    pub async fn revert(
        &self,
        project_id: &str,
        container_id: &str,
        target: &str,
    ) -> SnapshotResult<Reverted> {
        let handle = DocumentHandle::resolve(container_id, project_id)?;
        let safety = self.store(project_id, container_id).await?;

        let restored = self
            .log
            .load(&handle)
            .await?
            .into_iter()
            .find(|s| s.timestamp == target)
            .ok_or_else(|| {
                warn!(project = project_id, timestamp = target, "Revert target not found");
                SnapshotError::not_found(target)
            })?;

        self.provider
            .push(project_id, &restored.files)
            .await
            .inspect_err(|e| {
                warn!(project = project_id, timestamp = target, error = %e, "Push failed during revert");
            })?;

        info!(
            project = project_id,
            container = container_id,
            restored = %restored.timestamp,
            safety = %safety.timestamp,
            "Reverted project"
        );
        Ok(Reverted { safety, restored })
    }

    /// Remove every snapshot stamped `target`. Returns how many were removed.
    ///
    /// Deleting an unknown timestamp succeeds and leaves the log untouched.
    pub async fn delete(
        &self,
        project_id: &str,
        container_id: &str,
        target: &str,
    ) -> SnapshotResult<usize> {
        let handle = DocumentHandle::resolve(container_id, project_id)?;
        let mut snapshots = self.log.load(&handle).await?;

        let before = snapshots.len();
        snapshots.retain(|s| s.timestamp != target);
        let removed = before - snapshots.len();

        if removed > 0 {
            self.log.save(&handle, &snapshots).await?;
        }

        info!(
            project = project_id,
            container = container_id,
            timestamp = target,
            removed,
            "Deleted snapshot"
        );
        Ok(removed)
    }
}
