//! Unified path management for reelsync files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/reelsync/          # Config directory (platform default via `dirs`)
//! ├── config.toml              # Client configuration
//! └── session.toml             # Durable key-value storage (session token)
//! ```
//!
//! Every path can be re-rooted with an explicit base directory, which is what
//! tests and portable installs use.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "reelsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const SESSION_FILE_NAME: &str = "session.toml";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves reelsync file locations.
#[derive(Debug, Clone, Default)]
pub struct ReelsyncPaths {
    base: Option<PathBuf>,
}

impl ReelsyncPaths {
    /// Creates a resolver. `base` replaces the platform config directory when set.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the reelsync configuration directory (e.g. `~/.config/reelsync/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Default location of the persisted session token.
    ///
    /// # Security Note
    ///
    /// The file store writes this with 600 permissions on Unix.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(SESSION_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_explicit_base() {
        let base = PathBuf::from("/tmp/reelsync-test");
        let paths = ReelsyncPaths::new(Some(&base));

        assert_eq!(paths.config_dir().unwrap(), base);
        assert_eq!(paths.config_file().unwrap(), base.join("config.toml"));
        assert_eq!(paths.session_file().unwrap(), base.join("session.toml"));
    }

    #[test]
    fn test_platform_dir_ends_with_app_name() {
        // Only meaningful where the platform exposes a config dir.
        if let Ok(dir) = ReelsyncPaths::default().config_dir() {
            assert!(dir.ends_with("reelsync"));
        }
    }
}
