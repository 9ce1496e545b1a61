use super::models::Config;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("backend.base_url '{url}' is not a valid absolute URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Unsupported backend scheme '{scheme}', expected 'http://' or 'https://'")]
    UnsupportedScheme { scheme: String },

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: &'static str },

    #[error("downloads.directory must not be empty")]
    EmptyDownloadDirectory,

    #[error("backend.user_agent must not be empty")]
    EmptyUserAgent,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_backend(config)?;
    validate_downloads(config)?;
    Ok(())
}

fn validate_backend(config: &Config) -> Result<(), ValidationError> {
    let backend = &config.backend;

    let url = Url::parse(&backend.base_url).map_err(|e| ValidationError::InvalidBaseUrl {
        url: backend.base_url.clone(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }

    if backend.connect_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.connect_timeout",
        });
    }

    if backend.request_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.request_timeout",
        });
    }

    if backend.operation_timeout.is_some_and(|t| t.is_zero()) {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.operation_timeout",
        });
    }

    if backend.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    Ok(())
}

fn validate_downloads(config: &Config) -> Result<(), ValidationError> {
    if config.downloads.directory.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDownloadDirectory);
    }
    Ok(())
}
