//! In-process document store.
//!
//! Mirrors the remote store's observable behavior (server-assigned ids,
//! `$createdAt`/`$updatedAt` metadata, filter + order + limit listing) so the
//! synchronizers can run without a network. Can be switched offline to
//! exercise `StoreUnavailable` paths.

use async_trait::async_trait;
use chrono::Utc;
use reelsync_core::error::{ReelsyncError, Result};
use reelsync_core::store::{Collection, Document, DocumentStore, Fields, Query};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    offline: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `StoreUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Inserts a document as-is, bypassing the offline switch.
    ///
    /// Used to seed states the client itself would not produce, such as
    /// duplicate records left behind by concurrent writers.
    pub async fn insert_raw(&self, collection: Collection, fields: Fields) -> Document {
        let document = new_document(fields);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document.clone());
        document
    }

    /// Number of documents in a collection, bypassing the offline switch.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ReelsyncError::store_unavailable("document store is offline"));
        }
        Ok(())
    }
}

fn new_document(fields: Fields) -> Document {
    let now = Utc::now();
    Document {
        id: Uuid::new_v4().to_string(),
        created_at: Some(now),
        updated_at: Some(now),
        fields,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        let documents = collections.get(&collection).cloned().unwrap_or_default();
        Ok(query.apply(documents))
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document> {
        self.ensure_online()?;
        let document = new_document(fields);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| {
                ReelsyncError::store_unavailable(format!(
                    "document '{id}' not found in {collection}"
                ))
            })?;

        document.fields.extend(fields);
        document.updated_at = Some(Utc::now());
        Ok(document.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(ReelsyncError::store_unavailable(format!(
                "document '{id}' not found in {collection}"
            )));
        }
        Ok(())
    }
}
