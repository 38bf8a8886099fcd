//! Search-term popularity counter.

use reelsync_core::catalog::Movie;
use reelsync_core::error::Result;
use reelsync_core::store::{Collection, DocumentStore, Fields, Query, UPDATED_AT_FIELD};
use reelsync_core::trending::{COUNT_FIELD, TERM_FIELD, TrendingEntry, rank};
use serde_json::Value;
use std::sync::Arc;

/// Maintains one counter document per distinct search term.
///
/// Increments are read-modify-write and can lose updates under concurrent
/// writers; the counts are approximate by nature.
pub struct TrendingCounter {
    store: Arc<dyn DocumentStore>,
    image_base_url: String,
}

impl TrendingCounter {
    pub fn new(store: Arc<dyn DocumentStore>, image_base_url: impl Into<String>) -> Self {
        Self {
            store,
            image_base_url: image_base_url.into(),
        }
    }

    /// Counts one search for `term`, with `movie` as its representative result.
    ///
    /// The term is trimmed; an empty term is ignored.
    pub async fn record_search(&self, term: &str, movie: &Movie) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let query = Query::new().equal(TERM_FIELD, term);
        let existing = self.store.list(Collection::SearchTerms, &query).await?;

        let Some(first) = existing.first() else {
            let entry = TrendingEntry::first_search(term, movie, &self.image_base_url);
            self.store
                .create(Collection::SearchTerms, entry.to_fields()?)
                .await?;
            tracing::debug!(term, "search term first recorded");
            return Ok(());
        };

        if existing.len() > 1 {
            tracing::warn!(
                term,
                copies = existing.len(),
                "consistency violation: duplicate trending entries, incrementing the first"
            );
        }

        let count = TrendingEntry::from_document(first)?.count;
        let mut update = Fields::new();
        update.insert(COUNT_FIELD.to_string(), Value::from(count + 1));
        self.store
            .update(Collection::SearchTerms, &first.id, update)
            .await?;
        tracing::debug!(term, count = count + 1, "search term incremented");
        Ok(())
    }

    /// The `limit` most searched terms, highest count first.
    pub async fn top_terms(&self, limit: usize) -> Result<Vec<TrendingEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .order_desc(COUNT_FIELD)
            .order_desc(UPDATED_AT_FIELD)
            .order_asc(TERM_FIELD)
            .limit(limit);
        let documents = self.store.list(Collection::SearchTerms, &query).await?;

        let mut entries = Vec::with_capacity(documents.len());
        for document in &documents {
            match TrendingEntry::from_document(document) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(document_id = %document.id, error = %e, "skipping malformed trending entry")
                }
            }
        }
        rank(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsync_core::catalog::DEFAULT_IMAGE_BASE_URL;
    use reelsync_core::trending::DEFAULT_TOP_LIMIT;
    use reelsync_infrastructure::InMemoryDocumentStore;
    use serde_json::json;

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{id}.jpg")),
            vote_average: 7.0,
            release_date: None,
            genre_ids: vec![],
        }
    }

    fn setup() -> (Arc<InMemoryDocumentStore>, TrendingCounter) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let counter = TrendingCounter::new(store.clone(), DEFAULT_IMAGE_BASE_URL);
        (store, counter)
    }

    #[tokio::test]
    async fn test_repeated_search_increments_single_entry() {
        let (store, counter) = setup();
        let dune = movie(438631, "Dune");

        for _ in 0..3 {
            counter.record_search("dune", &dune).await.unwrap();
        }

        assert_eq!(store.count(Collection::SearchTerms).await, 1);
        let top = counter.top_terms(DEFAULT_TOP_LIMIT).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].term, "dune");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[0].representative_movie_id, 438631);
    }

    #[tokio::test]
    async fn test_top_terms_orders_by_count() {
        let (_store, counter) = setup();
        for _ in 0..3 {
            counter.record_search("dune", &movie(1, "Dune")).await.unwrap();
        }
        counter
            .record_search("arrival", &movie(2, "Arrival"))
            .await
            .unwrap();

        let top = counter.top_terms(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].term, "dune");

        let all = counter.top_terms(DEFAULT_TOP_LIMIT).await.unwrap();
        let terms: Vec<&str> = all.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["dune", "arrival"]);
    }

    #[tokio::test]
    async fn test_terms_are_trimmed_and_empty_ignored() {
        let (store, counter) = setup();
        counter.record_search("  dune ", &movie(1, "Dune")).await.unwrap();
        counter.record_search("dune", &movie(1, "Dune")).await.unwrap();
        counter.record_search("   ", &movie(1, "Dune")).await.unwrap();

        assert_eq!(store.count(Collection::SearchTerms).await, 1);
        assert_eq!(counter.top_terms(5).await.unwrap()[0].count, 2);
    }

    #[tokio::test]
    async fn test_duplicate_entries_increment_first() {
        let (store, counter) = setup();
        for count in [4, 1] {
            store
                .insert_raw(
                    Collection::SearchTerms,
                    json!({"searchTerm": "dune", "movie_id": 1, "title": "Dune", "count": count})
                        .as_object()
                        .cloned()
                        .unwrap(),
                )
                .await;
        }

        counter.record_search("dune", &movie(1, "Dune")).await.unwrap();

        let counts: Vec<u64> = counter
            .top_terms(5)
            .await
            .unwrap()
            .iter()
            .map(|e| e.count)
            .collect();
        assert_eq!(counts, vec![5, 1]);
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let (store, counter) = setup();
        store.set_offline(true);
        assert!(
            counter
                .record_search("dune", &movie(1, "Dune"))
                .await
                .unwrap_err()
                .is_store_unavailable()
        );
        assert!(counter.top_terms(5).await.unwrap_err().is_store_unavailable());
    }

    #[tokio::test]
    async fn test_float_count_is_incremented_and_garbage_is_not_reset() {
        let (store, counter) = setup();
        let seed = |term: &str, count: Value| {
            json!({"searchTerm": term, "movie_id": 1, "title": "Dune", "count": count})
                .as_object()
                .cloned()
                .unwrap()
        };
        store
            .insert_raw(Collection::SearchTerms, seed("dune", json!(3.0)))
            .await;
        store
            .insert_raw(Collection::SearchTerms, seed("arrival", json!("many")))
            .await;

        counter.record_search("dune", &movie(1, "Dune")).await.unwrap();
        let top = counter.top_terms(5).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 4);

        assert!(
            counter
                .record_search("arrival", &movie(2, "Arrival"))
                .await
                .is_err()
        );
        let arrival = store
            .list(
                Collection::SearchTerms,
                &Query::new().equal(TERM_FIELD, "arrival"),
            )
            .await
            .unwrap();
        assert_eq!(arrival[0].fields[COUNT_FIELD], json!("many"));
    }
}
