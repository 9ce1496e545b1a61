use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::models::{
    CandidateProfile, GeneratedDocumentSet, JobApplicationRequest, JobApplicationResult,
    ProfileUpdateRequest, ProfileUpdateResult,
};
use super::validation::{self, ValidationError};
use crate::config::ValidationConfig;
use crate::notify::Notification;
use crate::transport::{Method, Transport, TransportError};

const SUCCESS_TITLE: &str = "Success!";
const FAILURE_TITLE: &str = "Error";

/// A business operation: a typed mapping from request to response over the transport
///
/// Implementors are marker types; all behavior hangs off associated items so the
/// state machine can be generic over the operation.
pub trait Operation: Send + Sync + 'static {
    type Request: Serialize + Send + Sync;
    type Response: DeserializeOwned + Clone + Send + Sync + 'static;

    /// Name used in logs
    const NAME: &'static str;
    const METHOD: Method;
    const PATH: &'static str;

    /// Local checks run before anything is dispatched
    fn validate(request: &Self::Request, policy: &ValidationConfig) -> Result<(), ValidationError>;

    fn success_notice(response: &Self::Response) -> Notification;

    /// User-facing failure text, identical for every failure cause
    fn failure_notice() -> Notification;
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Validate, then dispatch. For callers that do not need lifecycle tracking.
pub async fn invoke<O: Operation>(
    transport: &dyn Transport,
    policy: &ValidationConfig,
    request: &O::Request,
) -> Result<O::Response, OperationError> {
    O::validate(request, policy)?;
    Ok(dispatch::<O>(transport, request).await?)
}

/// Encode, send and decode one request. Decoding fails closed on any shape mismatch.
pub(crate) async fn dispatch<O: Operation>(
    transport: &dyn Transport,
    request: &O::Request,
) -> Result<O::Response, TransportError> {
    let body = serde_json::to_value(request)?;

    let value = transport.send(O::METHOD, O::PATH, Some(body)).await?;

    let response = serde_json::from_value::<O::Response>(value).map_err(|e| {
        debug!(operation = O::NAME, error = %e, "Response shape mismatch");
        TransportError::DecodeFailure(format!("{} response: {}", O::NAME, e))
    })?;

    Ok(response)
}

/// `POST /generate-documents`
#[derive(Debug, Clone, Copy)]
pub struct GenerateDocuments;

impl Operation for GenerateDocuments {
    type Request = CandidateProfile;
    type Response = GeneratedDocumentSet;

    const NAME: &'static str = "generate_documents";
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/generate-documents";

    fn validate(request: &CandidateProfile, policy: &ValidationConfig) -> Result<(), ValidationError> {
        validation::validate_profile(request, policy)
    }

    fn success_notice(_: &GeneratedDocumentSet) -> Notification {
        Notification::success(
            SUCCESS_TITLE,
            "Your documents have been generated successfully.",
        )
    }

    fn failure_notice() -> Notification {
        Notification::failure(
            FAILURE_TITLE,
            "Failed to generate documents. Please try again.",
        )
    }
}

/// `POST /apply-job`
#[derive(Debug, Clone, Copy)]
pub struct ApplyToJob;

impl Operation for ApplyToJob {
    type Request = JobApplicationRequest;
    type Response = JobApplicationResult;

    const NAME: &'static str = "apply_to_job";
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/apply-job";

    fn validate(request: &JobApplicationRequest, policy: &ValidationConfig) -> Result<(), ValidationError> {
        validation::validate_job_application(request, policy)
    }

    fn success_notice(response: &JobApplicationResult) -> Notification {
        Notification::success(SUCCESS_TITLE, response.message.clone())
    }

    fn failure_notice() -> Notification {
        Notification::failure(
            FAILURE_TITLE,
            "Failed to process job application. Please try again.",
        )
    }
}

/// `POST /update-profile`
#[derive(Debug, Clone, Copy)]
pub struct UpdateProfile;

impl Operation for UpdateProfile {
    type Request = ProfileUpdateRequest;
    type Response = ProfileUpdateResult;

    const NAME: &'static str = "update_profile";
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/update-profile";

    fn validate(request: &ProfileUpdateRequest, policy: &ValidationConfig) -> Result<(), ValidationError> {
        validation::validate_profile_update(request, policy)
    }

    fn success_notice(_: &ProfileUpdateResult) -> Notification {
        Notification::success(SUCCESS_TITLE, "Profile suggestions generated successfully.")
    }

    fn failure_notice() -> Notification {
        Notification::failure(
            FAILURE_TITLE,
            "Failed to generate suggestions. Please try again.",
        )
    }
}

/// `GET /download/{filename}`
#[derive(Debug, Clone, Copy)]
pub struct DownloadArtifact;

impl DownloadArtifact {
    pub const NAME: &'static str = "download_artifact";

    /// Request path with `filename` percent-encoded as one segment
    pub fn path(filename: &str) -> Result<String, ValidationError> {
        validation::validate_filename(filename)?;
        Ok(format!("/download/{}", urlencoding::encode(filename.trim())))
    }

    pub fn success_notice(display_name: &str) -> Notification {
        Notification::success("Downloaded", format!("{} downloaded successfully.", display_name))
    }

    pub fn failure_notice() -> Notification {
        Notification::failure(FAILURE_TITLE, "Failed to download file.")
    }
}
