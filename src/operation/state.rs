use serde::Serialize;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::transport::TransportError;

/// Correlates a pending state with the terminal state it settles into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Fresh UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Http,
    Decode,
    Timeout,
    Cancelled,
}

/// Failure payload of a settled attempt
///
/// `message` is the uniform user-facing text; `cause` keeps the transport error
/// (when there was one) for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub cause: Option<TransportError>,
}

impl ErrorInfo {
    pub fn from_transport(err: TransportError, message: impl Into<String>) -> Self {
        let kind = match &err {
            TransportError::NetworkFailure { timed_out: true, .. } => ErrorKind::Timeout,
            TransportError::NetworkFailure { .. } => ErrorKind::Network,
            TransportError::HttpFailure { .. } => ErrorKind::Http,
            TransportError::DecodeFailure(_) => ErrorKind::Decode,
        };

        Self {
            kind,
            message: message.into(),
            cause: Some(err),
        }
    }

    pub fn timed_out(limit: Duration, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: message.into(),
            cause: Some(TransportError::NetworkFailure {
                reason: format!("no response within {:?}", limit),
                timed_out: true,
            }),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            message: message.into(),
            cause: None,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        self.cause.as_ref().and_then(TransportError::status)
    }

    /// One-line diagnostic including the underlying cause
    pub fn detail(&self) -> String {
        match &self.cause {
            Some(TransportError::HttpFailure {
                status,
                body: Some(body),
            }) => format!("HTTP {}: {}", status, body),
            Some(cause) => cause.to_string(),
            None => format!("{:?}", self.kind).to_lowercase(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Lifecycle of one operation instance
///
/// `Idle → Pending → Success | Failure`; both terminal states accept a new
/// submit, which moves back to `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    Idle,
    Pending { attempt: AttemptId },
    Success { attempt: AttemptId, value: T },
    Failure { attempt: AttemptId, error: ErrorInfo },
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        OperationState::Idle
    }
}

impl<T> OperationState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OperationState::Pending { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationState::Success { .. } | OperationState::Failure { .. }
        )
    }

    pub fn attempt(&self) -> Option<AttemptId> {
        match self {
            OperationState::Idle => None,
            OperationState::Pending { attempt }
            | OperationState::Success { attempt, .. }
            | OperationState::Failure { attempt, .. } => Some(*attempt),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            OperationState::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            OperationState::Failure { error, .. } => Some(error),
            _ => None,
        }
    }
}
