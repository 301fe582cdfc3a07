//! Configuration loading
//!
//! Settings come from an optional TOML file. The CLI layers command line
//! flags and environment variables on top of it.

use crate::catalog::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("Invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// No OMDb API key was configured
    #[error("No OMDb API key configured (set OMDB_API_KEY, pass --api-key or add it to the config file)")]
    MissingApiKey,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub omdb: OmdbConfig,
    /// Where collections are stored; the platform data directory when unset
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default location
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The configured API key, ignoring blank values
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.omdb
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// `config.toml` in the platform configuration directory
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "screen-scout")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
