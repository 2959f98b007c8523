//! # Workbench Configuration
//!
//! Where the database and photos live, and the percentages a new product
//! form starts with.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HPP_DB_PATH=./data/hpp.db                                          │
//! │     HPP_PHOTO_DIR=./data/photos                                        │
//! │     HPP_PHOTO_BASE_URL=http://localhost:8080/files                     │
//! │     HPP_DEFAULT_OVERHEAD=20                                            │
//! │     HPP_DEFAULT_MARGIN=30                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/hpp-workbench/hpp.toml (Linux)                           │
//! │     ~/Library/Application Support/com.hpp.workbench/hpp.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Platform data directory, 20% overhead, 30% margin                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # hpp.toml
//! [database]
//! path = "/var/lib/hpp/hpp.db"
//!
//! [photos]
//! dir = "/var/lib/hpp/photos"
//! base_url = "http://localhost:8080/files"
//!
//! [costing]
//! default_overhead_percentage = 20.0
//! default_target_margin_percentage = 30.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use hpp_core::validation::validate_percentage;
use hpp_core::{DEFAULT_OVERHEAD_PERCENTAGE, DEFAULT_TARGET_MARGIN_PERCENTAGE};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "hpp.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config file: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// SQLite database location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

/// Photo storage location and the URL the files are served under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSettings {
    #[serde(default = "default_photo_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_photo_base_url")]
    pub base_url: String,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        PhotoSettings {
            dir: default_photo_dir(),
            base_url: default_photo_base_url(),
        }
    }
}

/// Percentages a new product starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostingDefaults {
    #[serde(default = "default_overhead")]
    pub default_overhead_percentage: f64,

    #[serde(default = "default_margin")]
    pub default_target_margin_percentage: f64,
}

impl Default for CostingDefaults {
    fn default() -> Self {
        CostingDefaults {
            default_overhead_percentage: default_overhead(),
            default_target_margin_percentage: default_margin(),
        }
    }
}

fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "hpp", "workbench")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_db_path() -> PathBuf {
    data_dir().join("hpp.db")
}

fn default_photo_dir() -> PathBuf {
    data_dir().join("photos")
}

fn default_photo_base_url() -> String {
    "http://localhost:8080/files".to_string()
}

fn default_overhead() -> f64 {
    DEFAULT_OVERHEAD_PERCENTAGE
}

fn default_margin() -> f64 {
    DEFAULT_TARGET_MARGIN_PERCENTAGE
}

// =============================================================================
// App Config
// =============================================================================

/// Complete workbench configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub photos: PhotoSettings,

    #[serde(default)]
    pub costing: CostingDefaults,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (hpp.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Reads one TOML file; missing sections and keys take defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.photos.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("photos.dir must not be empty".into()));
        }

        let url = &self.photos.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("file://")
        {
            return Err(ConfigError::Invalid(format!(
                "photos.base_url must start with http://, https:// or file://, got: {}",
                url
            )));
        }

        validate_percentage(
            "costing.default_overhead_percentage",
            self.costing.default_overhead_percentage,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_percentage(
            "costing.default_target_margin_percentage",
            self.costing.default_target_margin_percentage,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    /// Applies `HPP_*` overrides read through `lookup`.
    ///
    /// Unparsable percentages are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("HPP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("HPP_PHOTO_DIR") {
            debug!(dir = %dir, "Overriding photo directory from environment");
            self.photos.dir = PathBuf::from(dir);
        }

        if let Some(url) = lookup("HPP_PHOTO_BASE_URL") {
            self.photos.base_url = url;
        }

        if let Some(value) = lookup("HPP_DEFAULT_OVERHEAD") {
            match value.trim().parse::<f64>() {
                Ok(p) => self.costing.default_overhead_percentage = p,
                Err(_) => warn!(value = %value, "Ignoring unparsable HPP_DEFAULT_OVERHEAD"),
            }
        }

        if let Some(value) = lookup("HPP_DEFAULT_MARGIN") {
            match value.trim().parse::<f64>() {
                Ok(p) => self.costing.default_target_margin_percentage = p,
                Err(_) => warn!(value = %value, "Ignoring unparsable HPP_DEFAULT_MARGIN"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hpp", "workbench")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_file(contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hpp-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.costing.default_overhead_percentage, 20.0);
        assert_eq!(config.costing.default_target_margin_percentage, 30.0);
        assert!(config.database.path.ends_with("hpp.db"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = temp_file(
            r#"
            [costing]
            default_overhead_percentage = 25.0
            "#,
        );

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.costing.default_overhead_percentage, 25.0);
        assert_eq!(config.costing.default_target_margin_percentage, 30.0);
        assert_eq!(config.photos, PhotoSettings::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("HPP_DB_PATH", "/tmp/env.db"),
            ("HPP_DEFAULT_MARGIN", "40"),
            ("HPP_DEFAULT_OVERHEAD", "lots"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.costing.default_target_margin_percentage, 40.0);
        assert_eq!(config.costing.default_overhead_percentage, 20.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range_percentage() {
        let mut config = AppConfig::default();
        config.costing.default_target_margin_percentage = 100.0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_target_margin_percentage"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.photos.base_url = "ftp://photos".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = std::env::temp_dir().join(format!("hpp-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join(CONFIG_FILE_NAME);

        let mut config = AppConfig::default();
        config.photos.base_url = "https://cdn.example.com".to_string();
        config.save(Some(path.clone())).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_file("[costing\nbroken");
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
