//! Tabstash configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tabstash_session::RenameCollision;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// What renaming onto an existing session name does
    pub rename_collision: RenameCollision,
    /// Default tracing filter; `RUST_LOG` takes precedence
    pub log_filter: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("tabstash.db"),
            rename_collision: RenameCollision::default(),
            log_filter: "info".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        platform_data_dir()
            .map(|d| d.join("tabstash"))
            .unwrap_or_else(|| PathBuf::from(".tabstash"))
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "database_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

/// Per-user application data directory for this platform.
fn platform_data_dir() -> Option<PathBuf> {
    let var = |name: &str| {
        std::env::var_os(name)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    };

    if cfg!(target_os = "windows") {
        var("LOCALAPPDATA")
    } else if cfg!(target_os = "macos") {
        var("HOME").map(|home| home.join("Library").join("Application Support"))
    } else {
        var("XDG_DATA_HOME").or_else(|| var("HOME").map(|home| home.join(".local").join("share")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = Config::new(PathBuf::from("/tmp/tabstash"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/tabstash/tabstash.db"));
        assert_eq!(config.rename_collision, RenameCollision::Allow);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_default_lives_in_data_dir() {
        let config = Config::default();
        let dir = config.database_path.parent().unwrap();
        assert!(dir.ends_with("tabstash") || dir.ends_with(".tabstash"));
        assert_eq!(dir, Config::data_dir());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{ "rename_collision": "reject" }"#).unwrap();
        assert_eq!(config.rename_collision, RenameCollision::Reject);
        assert_eq!(config.log_filter, "info");
        assert!(config.database_path.ends_with("tabstash.db"));
    }

    #[test]
    fn test_empty_database_path_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "database_path": "" }"#),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "log_filter": "debug" }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_filter, "debug");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));
    }
}
