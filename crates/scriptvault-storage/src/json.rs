//! JSON file-based storage implementation.
//!
//! Each key is stored as a separate JSON file:
//! `["root", "1AbCdEf"]` -> `<base>/root/1AbCdEf.json`

use crate::handle::validate_component;
use crate::{decode, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// JSON file-based storage.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    base_path: PathBuf,
}

impl JsonStorage {
    /// Create a new JSON storage at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base directory of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a key.
    pub fn key_to_path(&self, key: &[&str]) -> StorageResult<PathBuf> {
        for component in key {
            validate_component(component)?;
        }

        let (name, dirs) = key
            .split_last()
            .ok_or_else(|| StorageError::invalid_key("Key cannot be empty"))?;
        let mut path = self.base_path.clone();
        for component in dirs {
            path.push(component);
        }
        // Appended rather than set, so dotted names keep their full stem
        path.push(format!("{name}.json"));

        Ok(path)
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn read<T: DeserializeOwned + Send>(&self, key: &[&str]) -> StorageResult<Option<T>> {
        match self.raw(key).await? {
            Some(content) => decode(&content),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + Send + Sync>(
        &self,
        key: &[&str],
        value: &T,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Writing to storage");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(value)?;

        // Write to a sibling temp file, then rename over the target
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn raw(&self, key: &[&str]) -> StorageResult<Option<String>> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Reading from storage");

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        value: i32,
    }

    fn entry() -> Entry {
        Entry {
            name: "main".to_string(),
            value: 7,
        }
    }

    #[test]
    fn test_key_to_path_keeps_dotted_names() {
        let storage = JsonStorage::new("/data");
        assert_eq!(
            storage.key_to_path(&["root", "v1.2"]).unwrap(),
            PathBuf::from("/data/root/v1.2.json")
        );
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        storage.write(&["root", "proj"], &vec![entry()]).await.unwrap();

        let read: Option<Vec<Entry>> = storage.read(&["root", "proj"]).await.unwrap();
        assert_eq!(read, Some(vec![entry()]));
        assert!(dir.path().join("root").join("proj.json").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        let read: Option<Vec<Entry>> = storage.read(&["root", "missing"]).await.unwrap();
        assert_eq!(read, None);
        assert!(!storage.exists(&["root", "missing"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_document_reads_as_none() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        std::fs::create_dir_all(dir.path().join("root")).unwrap();
        std::fs::write(dir.path().join("root").join("proj.json"), "  \n").unwrap();

        let read: Option<Vec<Entry>> = storage.read(&["root", "proj"]).await.unwrap();
        assert_eq!(read, None);
        assert!(storage.exists(&["root", "proj"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());
        std::fs::create_dir_all(dir.path().join("root")).unwrap();
        std::fs::write(dir.path().join("root").join("proj.json"), "[{").unwrap();

        let read = storage.read::<Vec<Entry>>(&["root", "proj"]).await;
        assert!(matches!(read, Err(StorageError::Json(_))));
    }

    #[tokio::test]
    async fn test_raw_returns_written_text() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        storage.write(&["root", "proj"], &entry()).await.unwrap();
        let raw = storage.raw(&["root", "proj"]).await.unwrap().unwrap();
        assert!(raw.contains("\"main\""));
        assert!(!dir.path().join("root").join("proj.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path());

        assert!(storage.write(&[], &entry()).await.is_err());
        assert!(storage.write(&["..", "etc", "passwd"], &entry()).await.is_err());
        assert!(storage.write(&["path/traversal"], &entry()).await.is_err());
    }
}
