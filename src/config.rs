//! Application Configuration Module
//! Optional TOML file with file locations for the dataset, model and assets.

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "HOUSEPREDICT_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "housepredict.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Dataset location and layout.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub delimiter: char,
    pub id_column: String,
    pub target_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("train.csv"),
            test_path: PathBuf::from("test.csv"),
            delimiter: ';',
            id_column: "Id".to_string(),
            target_column: "SalePrice".to_string(),
        }
    }
}

/// Where to look for the serialized booster.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub pinned_path: PathBuf,
    pub search_dir: PathBuf,
    /// Intercept for tree dumps, which do not carry one.
    pub dump_base_score: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pinned_path: PathBuf::from("/opt/housepredict/xgboost_model.json"),
            search_dir: PathBuf::from("."),
            dump_base_score: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub architecture_image: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            architecture_image: PathBuf::from("architecture.png"),
        }
    }
}

/// Top-level configuration. Every field has a default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub assets: AssetConfig,
}

impl AppConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve the config path from the environment and load it.
    /// The dashboard must start even with a broken config, so errors fall back to defaults.
    pub fn from_env_or_default() -> Self {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; falling back to defaults", e);
                Self::default()
            }
        }
    }

    /// CSV delimiter as a byte for the polars reader.
    pub fn delimiter_byte(&self) -> u8 {
        if self.data.delimiter.is_ascii() {
            self.data.delimiter as u8
        } else {
            warn!(
                "Non-ASCII delimiter {:?} is not supported, using ';'",
                self.data.delimiter
            );
            b';'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data.delimiter, ';');
        assert_eq!(config.data.id_column, "Id");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::parse(
            r#"
            [data]
            train_path = "data/train.csv"

            [model]
            dump_base_score = 12.0
            "#,
        )
        .unwrap();

        assert_eq!(config.data.train_path, PathBuf::from("data/train.csv"));
        assert_eq!(config.data.test_path, PathBuf::from("test.csv"));
        assert_eq!(config.model.dump_base_score, 12.0);
        assert_eq!(config.model.search_dir, PathBuf::from("."));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[data\ntrain_path = ").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn non_ascii_delimiter_falls_back() {
        let mut config = AppConfig::default();
        config.data.delimiter = '§';
        assert_eq!(config.delimiter_byte(), b';');
        config.data.delimiter = ',';
        assert_eq!(config.delimiter_byte(), b',');
    }
}
