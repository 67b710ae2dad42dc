//! In-memory storage implementation for testing.

use crate::{decode, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing.
///
/// Documents are kept as JSON text so reads go through the same decoding
/// path as the file backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store document text verbatim, bypassing serialization.
    pub fn insert_raw(&self, key: &[&str], content: impl Into<String>) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.insert(Self::key_to_string(key), content.into());
        Ok(())
    }

    fn key_to_string(key: &[&str]) -> String {
        key.join("/")
    }
}

#[async_trait]
impl Storage for MemoryStorage {
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
        let json = serde_json::to_string(value)?;
        self.insert_raw(key, json)
    }

    async fn raw(&self, key: &[&str]) -> StorageResult<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(data.get(&Self::key_to_string(key)).cloned())
    }

    async fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(data.contains_key(&Self::key_to_string(key)))
    }
}
