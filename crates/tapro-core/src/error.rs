//! Error taxonomy for the API boundary.
//!
//! `AuthRequired` is deliberately its own variant rather than a 401 inside
//! `Http`: callers branch to a login flow on it instead of rendering a
//! generic failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured deadline.
    #[error("request timed out")]
    Timeout,

    /// Non-2xx response. `message` carries the server's `error` field when
    /// the body provides one.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No usable session, or the refresh flow failed on a 401.
    #[error("authentication required")]
    AuthRequired,

    /// A 2xx body that did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
