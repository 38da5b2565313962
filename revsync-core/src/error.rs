//! Error types for revsync

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for revsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for revsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus could not be retrieved (transport failure, timeout, bad status)
    #[error("Network error: {0}")]
    Network(String),

    /// Corpus body is not readable as tabular text
    #[error("Parse error: {0}")]
    Parse(String),

    /// A read against the external store failed
    #[error("Store query failed: {0}")]
    StoreQuery(#[source] StoreError),

    /// An insert failed; `inserted` rows were already written during this run
    #[error("Store write failed after {inserted} insert(s): {source}")]
    StoreWrite {
        inserted: usize,
        #[source]
        source: StoreError,
    },

    /// No review texts are available to assign
    #[error("Corpus is empty: no reviews available to assign")]
    EmptyCorpus,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
