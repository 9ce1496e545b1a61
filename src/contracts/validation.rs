use thiserror::Error;
use url::Url;

use super::models::{CandidateProfile, JobApplicationRequest, ProfileUpdateRequest};
use crate::config::ValidationConfig;

/// Request rejected locally, before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be an absolute http(s) URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    #[error("invalid artifact filename '{0}'")]
    InvalidFilename(String),
}

pub fn validate_profile(
    profile: &CandidateProfile,
    policy: &ValidationConfig,
) -> Result<(), ValidationError> {
    require("name", &profile.name)?;
    require("email", &profile.email)?;
    require("phone", &profile.phone)?;
    require("skills", &profile.skills)?;
    require("experience", &profile.experience)?;
    require("education", &profile.education)?;
    require("job_description", &profile.job_description)?;

    if policy.strict_urls {
        if let Some(url) = profile
            .linkedin_profile_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
        {
            check_url("linkedin_profile_url", url)?;
        }
    }

    Ok(())
}

pub fn validate_job_application(
    request: &JobApplicationRequest,
    policy: &ValidationConfig,
) -> Result<(), ValidationError> {
    require("job_url", &request.job_url)?;
    if policy.strict_urls {
        check_url("job_url", &request.job_url)?;
    }
    Ok(())
}

pub fn validate_profile_update(
    request: &ProfileUpdateRequest,
    policy: &ValidationConfig,
) -> Result<(), ValidationError> {
    require("profile_url", &request.profile_url)?;
    if policy.strict_urls {
        check_url("profile_url", &request.profile_url)?;
    }
    Ok(())
}

/// Artifact filenames travel as a single path segment
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    let trimmed = filename.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(ValidationError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn check_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let url = Url::parse(value.trim()).map_err(|e| ValidationError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::InvalidUrl {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().is_none() {
        return Err(ValidationError::InvalidUrl {
            field,
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}
