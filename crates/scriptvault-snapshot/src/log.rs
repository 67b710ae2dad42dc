//! Persisted snapshot log and search.

use crate::{Snapshot, SnapshotError, SnapshotResult};
use regex::{Regex, RegexBuilder};
use scriptvault_storage::{DocumentHandle, Storage};
use std::sync::Arc;
use tracing::debug;

/// The ordered snapshots of one project, stored as a single JSON array.
///
/// `save` is the only write primitive: append and delete are both
/// load, transform, save. Callers must serialize those cycles.
pub struct SnapshotLog<S> {
    storage: Arc<S>,
}

impl<S: Storage> SnapshotLog<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Load the log. A missing or blank document is an empty log.
    pub async fn load(&self, handle: &DocumentHandle) -> SnapshotResult<Vec<Snapshot>> {
        let snapshots: Vec<Snapshot> = self.storage.read(&handle.key()).await?.unwrap_or_default();
        debug!(log = %handle, snapshots = snapshots.len(), "Loaded snapshot log");
        Ok(snapshots)
    }

    /// Overwrite the log with `snapshots`.
    pub async fn save(&self, handle: &DocumentHandle, snapshots: &[Snapshot]) -> SnapshotResult<()> {
        self.storage.write(&handle.key(), &snapshots).await?;
        debug!(log = %handle, snapshots = snapshots.len(), "Saved snapshot log");
        Ok(())
    }
}

/// A compiled, case-insensitive source search.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
}

impl SearchPattern {
    /// Compile `pattern`. An empty pattern means "no filter" and yields `None`.
    pub fn parse(pattern: &str) -> SnapshotResult<Option<Self>> {
        if pattern.is_empty() {
            return Ok(None);
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SnapshotError::InvalidPattern(e.to_string()))?;
        Ok(Some(Self { regex }))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Keep the snapshots where at least one file's source matches, in order.
    pub fn filter(&self, snapshots: Vec<Snapshot>) -> Vec<Snapshot> {
        snapshots
            .into_iter()
            .filter(|s| s.matches(&self.regex))
            .collect()
    }
}

/// Filter `snapshots` by `pattern`; an empty pattern returns them unchanged.
pub fn search(snapshots: Vec<Snapshot>, pattern: &str) -> SnapshotResult<Vec<Snapshot>> {
    Ok(match SearchPattern::parse(pattern)? {
        Some(pattern) => pattern.filter(snapshots),
        None => snapshots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptvault_provider::SourceFile;
    use scriptvault_storage::{JsonStorage, MemoryStorage};
    use tempfile::tempdir;

    fn snap(ts: &str, sources: &[&str]) -> Snapshot {
        Snapshot::new(
            ts,
            sources
                .iter()
                .enumerate()
                .map(|(i, s)| SourceFile::script(format!("File{i}"), *s))
                .collect(),
        )
    }

    fn sample_log() -> Vec<Snapshot> {
        vec![
            snap("t1", &["function alpha() {}", "const x = 1;"]),
            snap("t2", &["function beta() {}"]),
            snap("t3", &["// ALPHA release", "function gamma() {}"]),
        ]
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let log = SnapshotLog::new(Arc::new(MemoryStorage::new()));
        let handle = DocumentHandle::resolve("root", "proj").unwrap();
        assert!(log.load(&handle).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_blank_document_is_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(&["root", "proj"], "").unwrap();
        let log = SnapshotLog::new(storage);
        let handle = DocumentHandle::resolve("root", "proj").unwrap();
        assert!(log.load(&handle).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let log = SnapshotLog::new(Arc::new(JsonStorage::new(dir.path())));
        let handle = DocumentHandle::resolve("root", "proj").unwrap();

        log.save(&handle, &sample_log()).await.unwrap();
        assert_eq!(log.load(&handle).await.unwrap(), sample_log());
    }

    #[tokio::test]
    async fn test_corrupt_document_surfaces_storage_error() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(&["root", "proj"], "{not json").unwrap();
        let log = SnapshotLog::new(storage);
        let handle = DocumentHandle::resolve("root", "proj").unwrap();
        assert!(matches!(
            log.load(&handle).await,
            Err(SnapshotError::Storage(_))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_and_ordered() {
        let found = search(sample_log(), "alpha").unwrap();
        let stamps: Vec<_> = found.iter().map(|s| s.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["t1", "t3"]);
    }

    #[test]
    fn test_search_any_file_matches() {
        let found = search(sample_log(), "const\\s+x").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp, "t1");
    }

    #[test]
    fn test_search_empty_pattern_is_noop() {
        assert_eq!(search(sample_log(), "").unwrap(), sample_log());
    }

    #[test]
    fn test_search_no_match_is_empty() {
        assert!(search(sample_log(), "foo").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(matches!(
            SearchPattern::parse("(unclosed"),
            Err(SnapshotError::InvalidPattern(_))
        ));
    }
}
