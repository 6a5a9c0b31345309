use std::fmt;

use tracker_core::{JobId, JobKind, RequestError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidPayload,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unreadable response"),
        }
    }
}

/// Submission was refused or never reached the backend; no job exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not submit job ({kind}): {message}")]
pub struct SubmissionError {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmissionError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<RequestError> for SubmissionError {
    fn from(err: RequestError) -> Self {
        Self::new(FailureKind::InvalidPayload, err.to_string())
    }
}

/// The status endpoint could not be observed. Says nothing about the job itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not check progress ({kind}): {message}")]
pub struct PollError {
    pub kind: FailureKind,
    pub message: String,
}

impl PollError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not refresh dataset ({kind}): {message}")]
pub struct RefreshError {
    pub kind: FailureKind,
    pub message: String,
}

impl RefreshError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    #[error("a {kind} job is already running")]
    AlreadyRunning { kind: JobKind },
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("tracking for {kind} was cancelled before job {job_id} was accepted")]
    Cancelled { kind: JobKind, job_id: JobId },
}
