use thiserror::Error;

/// Normalized failure of a single request against the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response was received (connection refused, DNS, timeout, interrupted body)
    #[error("no response from backend: {reason}")]
    NetworkFailure { reason: String, timed_out: bool },

    /// A response arrived with a non-2xx status
    #[error("backend returned HTTP {status}")]
    HttpFailure { status: u16, body: Option<String> },

    /// The response body did not have the expected shape
    #[error("failed to decode response: {0}")]
    DecodeFailure(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::NetworkFailure { timed_out: true, .. })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::NetworkFailure {
            timed_out: err.is_timeout(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::DecodeFailure(err.to_string())
    }
}
