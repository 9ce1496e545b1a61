//! Operation contracts for the job-flow backend
//!
//! Each business operation is a marker type implementing [`Operation`]: it
//! names its endpoint, its typed request and response, its local validation
//! rules and the notification texts shown for its outcomes.
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | [`GenerateDocuments`] | POST | `/generate-documents` |
//! | [`ApplyToJob`] | POST | `/apply-job` |
//! | [`UpdateProfile`] | POST | `/update-profile` |
//! | [`DownloadArtifact`] | GET | `/download/{filename}` |

mod models;
mod operations;
mod validation;

pub use models::{
    ArtifactReference, COVER_LETTER_DISPLAY_NAME, CV_DISPLAY_NAME, CandidateProfile,
    GeneratedDocumentSet, JobApplicationRequest, JobApplicationResult, ProfileUpdateRequest,
    ProfileUpdateResult,
};
pub(crate) use operations::dispatch;
pub use operations::{
    ApplyToJob, DownloadArtifact, GenerateDocuments, Operation, OperationError, UpdateProfile,
    invoke,
};
pub use validation::ValidationError;
