use crate::catalog::DEFAULT_IMAGE_BASE_URL;
use crate::error::{ReelsyncError, Result};
use crate::store::Collection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_STORE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
const DEFAULT_CATALOG_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_LOG_FILTER: &str = "info";

/// Root client configuration (`config.toml`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the credential service.
    pub backend_url: String,
    pub store: StoreConfig,
    pub catalog: CatalogConfig,
    /// Where the session token is persisted. Defaults to the config directory.
    pub token_file: Option<PathBuf>,
    /// Optional per-request timeout for the HTTP clients. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            store: StoreConfig::default(),
            catalog: CatalogConfig::default(),
            token_file: None,
            request_timeout_secs: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub search_terms_collection: String,
    pub saved_items_collection: String,
}

impl StoreConfig {
    /// Remote collection id for a logical collection.
    pub fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::SearchTerms => &self.search_terms_collection,
            Collection::SavedItems => &self.saved_items_collection,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STORE_ENDPOINT.to_string(),
            project_id: String::new(),
            database_id: String::new(),
            api_key: None,
            search_terms_collection: Collection::SearchTerms.as_str().to_string(),
            saved_items_collection: Collection::SavedItems.as_str().to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub image_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            api_key: String::new(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Checks the values that would otherwise fail late, on the first request.
    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("backend_url", &self.backend_url),
            ("store.endpoint", &self.store.endpoint),
            ("catalog.base_url", &self.catalog.base_url),
            ("catalog.image_base_url", &self.catalog.image_base_url),
        ];
        for (name, value) in urls {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ReelsyncError::config(format!(
                    "{name} must be an http(s) URL, got '{value}'"
                )));
            }
        }

        if self.store.search_terms_collection.trim().is_empty()
            || self.store.saved_items_collection.trim().is_empty()
        {
            return Err(ReelsyncError::config("collection ids must not be empty"));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ReelsyncError::config(
                "request_timeout_secs must be greater than zero",
            ));
        }

        Ok(())
    }
}
