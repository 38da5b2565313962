//! Error types for Supabase operations

use revsync_core::StoreError;
use thiserror::Error;

/// Result type for Supabase operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to Supabase
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("Supabase request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from PostgREST
    #[error("Supabase returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Invalid endpoint or table path
    #[error("Invalid Supabase URL: {0}")]
    Url(String),

    /// Authentication setup error
    #[error("Supabase authentication error: {0}")]
    Auth(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) if e.is_decode() => StoreError::Decode(e.to_string()),
            Error::Http(e) => StoreError::Transport(e.to_string()),
            Error::Status { status, message } => StoreError::Rejected { status, message },
            Error::Parse(msg) => StoreError::Decode(msg),
            other => StoreError::Transport(other.to_string()),
        }
    }
}

/// Setup failures surfaced to the job runner
///
/// Transport problems stay network errors; bad endpoints and keys are
/// configuration errors.
impl From<Error> for revsync_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) => revsync_core::Error::Network(format!("Supabase client setup failed: {}", e)),
            Error::Url(_) | Error::Auth(_) => revsync_core::Error::Config(err.to_string()),
            other => revsync_core::Error::StoreQuery(other.into()),
        }
    }
}
