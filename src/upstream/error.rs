//! Errors returned by calls to the backend API.

use axum::http::StatusCode;
use serde_json::Value;

/// Coarse classification of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend answered with a non-success status and a JSON body
    Rejected,
    /// The backend answered with something that is not usable JSON
    BadResponse,
    /// The request never got an answer (connect error, timeout, ...)
    Network,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Backend rejected the request with status {status}")]
    Rejected { status: StatusCode, body: Value },
    #[error("Backend returned an unusable response (status {status}): {reason}")]
    BadResponse { status: StatusCode, reason: String },
    #[error("Backend request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl UpstreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpstreamError::Rejected { .. } => ErrorKind::Rejected,
            UpstreamError::BadResponse { .. } => ErrorKind::BadResponse,
            UpstreamError::Network(_) => ErrorKind::Network,
        }
    }

    /// Status the backend answered with, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Rejected { status, .. } | UpstreamError::BadResponse { status, .. } => {
                Some(*status)
            }
            UpstreamError::Network(e) => e.status(),
        }
    }
}
