//! Saved-movie membership on top of the document store.
//!
//! The store has no uniqueness constraint, so `toggle` is read-then-act and
//! two devices racing can leave duplicates behind. Readers tolerate them and
//! the next removal deletes every copy.

use chrono::Utc;
use reelsync_core::catalog::Movie;
use reelsync_core::error::Result;
use reelsync_core::saved::{MOVIE_FIELD, OWNER_FIELD, SAVED_AT_FIELD, SavedItem, SavedState};
use reelsync_core::store::{Collection, Document, DocumentStore, Query};
use std::sync::Arc;

pub struct SavedItemSynchronizer {
    store: Arc<dyn DocumentStore>,
    image_base_url: String,
}

impl SavedItemSynchronizer {
    pub fn new(store: Arc<dyn DocumentStore>, image_base_url: impl Into<String>) -> Self {
        Self {
            store,
            image_base_url: image_base_url.into(),
        }
    }

    async fn matches(&self, owner_id: &str, movie_id: u64) -> Result<Vec<Document>> {
        let query = Query::new()
            .equal(OWNER_FIELD, owner_id)
            .equal(MOVIE_FIELD, movie_id.to_string());
        let documents = self.store.list(Collection::SavedItems, &query).await?;
        if documents.len() > 1 {
            tracing::warn!(
                owner_id,
                movie_id,
                copies = documents.len(),
                "consistency violation: duplicate saved items"
            );
        }
        Ok(documents)
    }

    pub async fn is_saved(&self, owner_id: &str, movie_id: u64) -> Result<bool> {
        Ok(!self.matches(owner_id, movie_id).await?.is_empty())
    }

    /// Flips membership of `movie` in the owner's saved set.
    ///
    /// Removal deletes every matching record.
    pub async fn toggle(&self, owner_id: &str, movie: &Movie) -> Result<SavedState> {
        let existing = self.matches(owner_id, movie.id).await?;

        if existing.is_empty() {
            let item = SavedItem::from_movie(owner_id, movie, &self.image_base_url, Utc::now());
            self.store
                .create(Collection::SavedItems, item.to_fields()?)
                .await?;
            tracing::debug!(owner_id, movie_id = movie.id, "movie saved");
            return Ok(SavedState::Saved);
        }

        for document in &existing {
            self.store
                .delete(Collection::SavedItems, &document.id)
                .await?;
        }
        tracing::debug!(owner_id, movie_id = movie.id, removed = existing.len(), "movie unsaved");
        Ok(SavedState::NotSaved)
    }

    /// The owner's saved items, most recently saved first.
    ///
    /// Records that no longer parse are skipped with a warning.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<SavedItem>> {
        let query = Query::new()
            .equal(OWNER_FIELD, owner_id)
            .order_desc(SAVED_AT_FIELD);
        let documents = self.store.list(Collection::SavedItems, &query).await?;

        let mut items: Vec<SavedItem> = documents
            .iter()
            .filter_map(|document| match SavedItem::from_document(document) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(document_id = %document.id, error = %e, "skipping malformed saved item");
                    None
                }
            })
            .collect();
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(items)
    }
}
