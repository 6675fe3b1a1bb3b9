//! Error taxonomy for a single poll cycle.
//!
//! None of these are fatal to the watcher: every variant is logged and the
//! cycle is treated as a no-op, then retried at the current interval.

use http::StatusCode;
use thiserror::Error;

/// Why a fetch did not produce a usable payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout, reset, or a body that could not be read.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Anything other than 200 or 304.
    #[error("status page returned {status}")]
    UnexpectedStatus { status: StatusCode },

    /// The body was not a status summary.
    #[error("malformed summary payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Retry classification. Both kinds currently retry on the next poll; the
/// split exists so backoff can treat them differently later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    NonRetryable,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) | FetchError::Decode(_) => ErrorKind::Transient,
            FetchError::UnexpectedStatus { status } => classify_status(*status),
        }
    }
}

fn classify_status(status: StatusCode) -> ErrorKind {
    if status.is_server_error() {
        return ErrorKind::Transient;
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            ErrorKind::Transient
        }
        _ => ErrorKind::NonRetryable,
    }
}

/// Invalid watcher configuration. Only raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("status_url must not be empty")]
    EmptyUrl,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}
