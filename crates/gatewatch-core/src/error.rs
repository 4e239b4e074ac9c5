//! Error types for polling and authenticating against a gateway.

use std::io;
use thiserror::Error;

/// Result type for a single poll of a signal source.
pub type FetchResult<T> = Result<T, FetchError>;

/// A failed read from a signal source.
///
/// Every variant is transient: the sampler never retries on its own, the
/// next scheduled tick simply tries again.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, reset.
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The gateway answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not JSON, or lacked a required object.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A fixture file could not be read.
    #[error("failed to read fixture: {0}")]
    Io(#[from] io::Error),
}

impl FetchError {
    /// Short machine-friendly label for status reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Login did not yield a bearer credential.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The gateway replied but the body carried no `auth.token`.
    #[error("Problem logging in")]
    Rejected,

    /// The login request itself failed.
    #[error("login request failed: {0}")]
    Transport(String),
}
