use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
}

/// Remote service endpoint and transport limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    /// Upper bound for a whole operation attempt, on top of the per-request timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_timeout: Option<HumanDuration>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bearer token (loaded from environment, not from config file)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            operation_timeout: None,
            user_agent: default_user_agent(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(120)
}

fn default_user_agent() -> String {
    format!("jobflow/{}", env!("CARGO_PKG_VERSION"))
}

/// Client-side request validation policy
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Require job/profile URLs to be absolute http(s) URLs before dispatch.
    /// Off by default: the service decides what a valid posting URL is.
    #[serde(default)]
    pub strict_urls: bool,
}

/// Where downloaded artifacts are saved
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_directory")]
    pub directory: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_directory(),
        }
    }
}

fn default_download_directory() -> PathBuf {
    PathBuf::from("downloads")
}
