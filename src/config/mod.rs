//! Configuration management for the jobflow client
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use jobflow::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Backend: {}", config.backend.base_url);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `JOBFLOW__<section>__<key>`
//!
//! Examples:
//! - `JOBFLOW__BACKEND__BASE_URL=https://jobs.example.com`
//! - `JOBFLOW__BACKEND__REQUEST_TIMEOUT=45s`
//! - `JOBFLOW__VALIDATION__STRICT_URLS=true`
//!
//! The API key is only ever read from `JOBFLOW_API_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/jobflow.toml`.
//! This can be overridden using the `JOBFLOW_CONFIG` environment variable.
//!
//! A loaded [`Config`] is immutable for the lifetime of a session. To point the
//! client at another backend, load or build a new `Config` and open a new session.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{BackendConfig, Config, DownloadConfig, ValidationConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`JOBFLOW__*`, `JOBFLOW_API_KEY`)
    /// 2. TOML file (default: `config/jobflow.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`Config::load`], with an explicit file path taking precedence over `JOBFLOW_CONFIG`
    pub fn load_with(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path (no `.env`, no secrets)
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Return a copy pointing at another backend, re-validated
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        self.backend.base_url = base_url.into();
        validation::validate(&self)?;
        Ok(self)
    }

    /// Return a copy saving artifacts into `directory`, re-validated
    pub fn with_download_directory(mut self, directory: PathBuf) -> Result<Self, ConfigError> {
        self.downloads.directory = directory;
        validation::validate(&self)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[backend]\nbase_url = \"http://127.0.0.1:9000\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.backend.request_timeout.to_string(), "2m");
    }

    #[test]
    fn test_validation_catches_bad_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[backend]\nbase_url = \"not a url\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_malformed_duration_is_a_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[backend]\nrequest_timeout = \"soon\"\n").unwrap();

        assert!(matches!(
            Config::load_from_path(config_path),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn test_with_base_url_revalidates() {
        let config = Config::default()
            .with_base_url("https://jobs.example.com")
            .unwrap();
        assert_eq!(config.backend.base_url, "https://jobs.example.com");

        assert!(Config::default().with_base_url("mailto:me@example.com").is_err());
    }
}
