//! Wire models for the backend operations.
//!
//! ```json
//! POST /generate-documents
//! {
//!   "name": "Ada Lovelace",
//!   "email": "ada@example.com",
//!   "phone": "+44 20 7946 0000",
//!   "skills": "Analysis, Mathematics",
//!   "experience": "Analyst at Babbage & Co (1842-1843)",
//!   "education": "Private tutoring",
//!   "job_description": "Senior engine programmer...",
//!   "linkedin_profile_url": "https://www.linkedin.com/in/ada"
//! }
//! -> { "cv_path": "...", "cover_letter_path": "...", "cv_preview": "...", "cover_letter_preview": "..." }
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Suggested local file name for a saved CV
pub const CV_DISPLAY_NAME: &str = "CV.docx";
/// Suggested local file name for a saved cover letter
pub const COVER_LETTER_DISPLAY_NAME: &str = "CoverLetter.docx";

/// Personal and job data sent for document generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub job_description: String,
    /// Blank values are treated as absent and left off the wire
    #[serde(default, skip_serializing_if = "is_blank")]
    pub linkedin_profile_url: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Result of a successful generation: two artifact identifiers and their previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocumentSet {
    pub cv_path: String,
    pub cover_letter_path: String,
    pub cv_preview: String,
    pub cover_letter_preview: String,
}

impl GeneratedDocumentSet {
    pub fn cv(&self) -> ArtifactReference {
        ArtifactReference::new(&self.cv_path, CV_DISPLAY_NAME)
    }

    pub fn cover_letter(&self) -> ArtifactReference {
        ArtifactReference::new(&self.cover_letter_path, COVER_LETTER_DISPLAY_NAME)
    }

    pub fn artifacts(&self) -> [ArtifactReference; 2] {
        [self.cv(), self.cover_letter()]
    }
}

/// Service-issued artifact identifier paired with a local display name
///
/// Only obtainable from a [`GeneratedDocumentSet`]; there is no catalog of
/// artifacts outside a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    identifier: String,
    display_name: String,
}

impl ArtifactReference {
    fn new(identifier: &str, display_name: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplicationRequest {
    pub job_url: String,
}

impl JobApplicationRequest {
    pub fn new(job_url: impl Into<String>) -> Self {
        Self {
            job_url: job_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplicationResult {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub profile_url: String,
}

impl ProfileUpdateRequest {
    pub fn new(profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateResult {
    pub message: String,
    pub profile_suggestions: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_profile() -> CandidateProfile {
        CandidateProfile::builder()
            .name("Ada Lovelace")
            .email("ada@example.com")
            .phone("+44 20 7946 0000")
            .skills("Analysis, Mathematics")
            .experience("Analyst at Babbage & Co")
            .education("Private tutoring")
            .job_description("Senior engine programmer")
            .build()
    }

    #[test]
    fn profile_omits_absent_or_blank_linkedin_url() {
        let mut profile = sample_profile();
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("linkedin_profile_url").is_none());

        profile.linkedin_profile_url = Some("  ".to_string());
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("linkedin_profile_url").is_none());

        profile.linkedin_profile_url = Some("https://www.linkedin.com/in/ada".to_string());
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["linkedin_profile_url"], "https://www.linkedin.com/in/ada");
        assert_eq!(value["job_description"], "Senior engine programmer");
    }

    #[test]
    fn document_set_rejects_missing_fields() {
        let partial = json!({ "cv_path": "CV_1.docx", "cover_letter_path": "CL_1.docx" });
        assert!(serde_json::from_value::<GeneratedDocumentSet>(partial).is_err());

        let with_null = json!({
            "cv_path": "CV_1.docx",
            "cover_letter_path": null,
            "cv_preview": "...",
            "cover_letter_preview": "..."
        });
        assert!(serde_json::from_value::<GeneratedDocumentSet>(with_null).is_err());
    }

    #[test]
    fn document_set_exposes_artifact_references() {
        let set = GeneratedDocumentSet {
            cv_path: "CV_123.docx".to_string(),
            cover_letter_path: "CoverLetter_123.docx".to_string(),
            cv_preview: "Ada Lovelace".to_string(),
            cover_letter_preview: "Dear hiring manager".to_string(),
        };

        let [cv, letter] = set.artifacts();
        assert_eq!(cv.identifier(), "CV_123.docx");
        assert_eq!(cv.display_name(), CV_DISPLAY_NAME);
        assert_eq!(letter.identifier(), "CoverLetter_123.docx");
        assert_eq!(letter.display_name(), COVER_LETTER_DISPLAY_NAME);
    }
}
