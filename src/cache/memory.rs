use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheError, CacheStore};

/// Process-local store. Writers take the lock exclusively, readers share it.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, location_key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(location_key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(entry.location_key.clone(), entry);
        Ok(())
    }

    async fn delete_expired(&self, now_millis: i64) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now_millis));
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let mut all: Vec<CacheEntry> = self.entries.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.location_key.cmp(&b.location_key));
        Ok(all)
    }
}
