//! File-backed durable key-value storage.

use super::atomic_toml::AtomicTomlFile;
use async_trait::async_trait;
use reelsync_core::error::{ReelsyncError, Result};
use reelsync_core::session::KeyValueStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

type Entries = BTreeMap<String, String>;

/// Key-value storage persisted as a small private TOML table.
///
/// File I/O runs on the blocking pool. Reads report a corrupt file as an
/// error; writes and removals replace it so the store can always recover.
#[derive(Clone)]
pub struct FileKeyValueStore {
    file: Arc<AtomicTomlFile<Entries>>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path).private()),
        }
    }

    async fn run_blocking<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicTomlFile<Entries>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| ReelsyncError::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run_blocking(move |file| {
            let entries = file.load()?.unwrap_or_default();
            Ok(entries.get(&key).cloned())
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        let ((), discarded) = self
            .run_blocking(move |file| {
                Ok(file.update(Entries::new(), |entries| {
                    entries.insert(key, value);
                })?)
            })
            .await?;
        if discarded {
            tracing::warn!(path = %self.file.path().display(), "unreadable key-value file replaced");
        }
        tracing::debug!(path = %self.file.path().display(), "key-value entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        let discarded = self
            .run_blocking(move |file| {
                if !file.path().exists() {
                    return Ok(false);
                }
                let ((), discarded) = file.update(Entries::new(), |entries| {
                    entries.remove(&key);
                })?;
                Ok(discarded)
            })
            .await?;
        if discarded {
            tracing::warn!(path = %self.file.path().display(), "unreadable key-value file cleared");
        }
        Ok(())
    }
}
