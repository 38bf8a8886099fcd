use async_trait::async_trait;
use reelsync_core::error::Result;
use reelsync_core::session::KeyValueStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local key-value storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, handy for simulating a previous launch.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_entry() {
        let store = MemoryKeyValueStore::with_entry("token", "abc");
        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("abc"));
        store.remove("token").await.unwrap();
        assert_eq!(store.get("token").await.unwrap(), None);
    }
}
