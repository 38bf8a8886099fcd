//! Movie search and browsing.

use crate::trending::TrendingCounter;
use reelsync_core::catalog::{Movie, MovieCatalog, MovieDetail};
use reelsync_core::error::Result;
use std::sync::Arc;

/// Use case behind the search screen and the browse feeds.
///
/// A search also bumps the trending counter for its term. That write is best
/// effort: a failure there is logged and never fails the search.
pub struct SearchUseCase {
    catalog: Arc<dyn MovieCatalog>,
    trending: Arc<TrendingCounter>,
}

impl SearchUseCase {
    pub fn new(catalog: Arc<dyn MovieCatalog>, trending: Arc<TrendingCounter>) -> Self {
        Self { catalog, trending }
    }

    /// Searches the catalog. An empty query returns popular movies instead.
    pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return self.catalog.popular().await;
        }

        let movies = self.catalog.search(query).await?;
        if let Some(first) = movies.first() {
            if let Err(e) = self.trending.record_search(query, first).await {
                tracing::warn!(query, error = %e, "failed to record search term");
            }
        }
        Ok(movies)
    }

    /// This week's trending movies from the catalog.
    pub async fn trending_movies(&self) -> Result<Vec<Movie>> {
        self.catalog.trending().await
    }

    pub async fn details(&self, movie_id: u64) -> Result<MovieDetail> {
        self.catalog.details(movie_id).await
    }
}
