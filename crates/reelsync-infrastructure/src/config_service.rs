//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml` (platform config dir unless an
//! explicit file is given), applies `REELSYNC_*` environment overrides and
//! validates the result. A missing file means "all defaults".

use crate::paths::ReelsyncPaths;
use reelsync_core::config::ClientConfig;
use reelsync_core::error::{ReelsyncError, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variables that override file values.
pub const ENV_BACKEND_URL: &str = "REELSYNC_BACKEND_URL";
pub const ENV_STORE_ENDPOINT: &str = "REELSYNC_STORE_ENDPOINT";
pub const ENV_STORE_PROJECT_ID: &str = "REELSYNC_STORE_PROJECT_ID";
pub const ENV_STORE_DATABASE_ID: &str = "REELSYNC_STORE_DATABASE_ID";
pub const ENV_STORE_API_KEY: &str = "REELSYNC_STORE_API_KEY";
pub const ENV_TMDB_API_KEY: &str = "REELSYNC_TMDB_API_KEY";
pub const ENV_TOKEN_FILE: &str = "REELSYNC_TOKEN_FILE";
pub const ENV_LOG: &str = "REELSYNC_LOG";

/// Loads and caches the client configuration.
#[derive(Clone)]
pub struct ConfigService {
    paths: ReelsyncPaths,
    explicit_file: Option<PathBuf>,
    env: EnvLookup,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    pub fn new(paths: ReelsyncPaths, explicit_file: Option<PathBuf>) -> Self {
        Self {
            paths,
            explicit_file,
            env: Arc::new(|key| std::env::var(key).ok()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the process environment as the override source.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Where the session token lives: `token_file` if set, else the config dir.
    pub fn token_file(&self, config: &ClientConfig) -> Result<PathBuf> {
        match &config.token_file {
            Some(path) => Ok(path.clone()),
            None => self
                .paths
                .session_file()
                .map_err(|e| ReelsyncError::config(e.to_string())),
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.explicit_file {
            Some(path) => Ok(path.clone()),
            None => self
                .paths
                .config_file()
                .map_err(|e| ReelsyncError::config(e.to_string())),
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let path = self.config_path()?;

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str::<ClientConfig>(&content)?
        } else if self.explicit_file.is_some() {
            return Err(ReelsyncError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            ClientConfig::default()
        };

        self.apply_env(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&self, config: &mut ClientConfig) {
        let env = &self.env;
        if let Some(v) = env(ENV_BACKEND_URL) {
            config.backend_url = v;
        }
        if let Some(v) = env(ENV_STORE_ENDPOINT) {
            config.store.endpoint = v;
        }
        if let Some(v) = env(ENV_STORE_PROJECT_ID) {
            config.store.project_id = v;
        }
        if let Some(v) = env(ENV_STORE_DATABASE_ID) {
            config.store.database_id = v;
        }
        if let Some(v) = env(ENV_STORE_API_KEY) {
            config.store.api_key = Some(v);
        }
        if let Some(v) = env(ENV_TMDB_API_KEY) {
            config.catalog.api_key = v;
        }
        if let Some(v) = env(ENV_TOKEN_FILE) {
            config.token_file = Some(PathBuf::from(v));
        }
        if let Some(v) = env(ENV_LOG) {
            config.log_filter = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(ReelsyncPaths::new(Some(temp_dir.path())), None)
            .with_env(no_env);

        assert_eq!(service.get_config().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(
            ReelsyncPaths::new(Some(temp_dir.path())),
            Some(temp_dir.path().join("nope.toml")),
        )
        .with_env(no_env);

        assert!(matches!(service.get_config(), Err(ReelsyncError::Config(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.toml"),
            r#"
            backend_url = "https://file.example"
            [catalog]
            api_key = "from-file"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_TMDB_API_KEY, "from-env"),
            (ENV_STORE_API_KEY, "store-key"),
            (ENV_LOG, "debug"),
        ]
        .into_iter()
        .collect();
        let service = ConfigService::new(ReelsyncPaths::new(Some(temp_dir.path())), None)
            .with_env(move |key| env.get(key).map(|v| v.to_string()));

        let config = service.get_config().unwrap();
        assert_eq!(config.backend_url, "https://file.example");
        assert_eq!(config.catalog.api_key, "from-env");
        assert_eq!(config.store.api_key.as_deref(), Some("store-key"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(ReelsyncPaths::new(Some(temp_dir.path())), None)
            .with_env(|key| (key == ENV_BACKEND_URL).then(|| "not a url".to_string()));

        assert!(matches!(service.get_config(), Err(ReelsyncError::Config(_))));
    }

    #[test]
    fn test_config_is_cached_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(ReelsyncPaths::new(Some(temp_dir.path())), None)
            .with_env(no_env);

        assert_eq!(service.get_config().unwrap().log_filter, "info");
        fs::write(&path, "log_filter = \"trace\"").unwrap();
        assert_eq!(service.get_config().unwrap().log_filter, "info");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().log_filter, "trace");
    }

    #[test]
    fn test_token_file_defaults_to_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(ReelsyncPaths::new(Some(temp_dir.path())), None)
            .with_env(no_env);

        let mut config = ClientConfig::default();
        assert_eq!(
            service.token_file(&config).unwrap(),
            temp_dir.path().join("session.toml")
        );
        config.token_file = Some(PathBuf::from("/tmp/custom.toml"));
        assert_eq!(
            service.token_file(&config).unwrap(),
            PathBuf::from("/tmp/custom.toml")
        );
    }
}
