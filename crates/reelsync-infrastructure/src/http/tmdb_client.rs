use super::{error_message, join_url};
use async_trait::async_trait;
use reelsync_core::catalog::{Movie, MovieCatalog, MovieDetail};
use reelsync_core::config::CatalogConfig;
use reelsync_core::error::{ReelsyncError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Movie>,
}

/// Movie catalog backed by the TMDB v3 API.
pub struct TmdbCatalog {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbCatalog {
    pub fn new(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(join_url(&self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| ReelsyncError::catalog(format!("{path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ReelsyncError::catalog(format!(
                "{path}: {} {message}",
                status.as_u16()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ReelsyncError::catalog(format!("{path}: malformed response: {e}")))
    }

    async fn page(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<Movie>> {
        let page: Page = self.get(path, params).await?;
        tracing::debug!(path, results = page.results.len(), "catalog page fetched");
        Ok(page.results)
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        self.page("search/movie", &[("query", query)]).await
    }

    async fn popular(&self) -> Result<Vec<Movie>> {
        self.page("movie/popular", &[]).await
    }

    async fn trending(&self) -> Result<Vec<Movie>> {
        self.page("trending/movie/week", &[]).await
    }

    async fn details(&self, id: u64) -> Result<MovieDetail> {
        self.get(&format!("movie/{id}"), &[]).await
    }
}
