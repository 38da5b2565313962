//! Seam between the job and the external user/review store
//!
//! The job only ever reads usernames, reads the reviewers already recorded for
//! the target, and appends review rows. Backends implement [`ReviewStore`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ReviewAssignment, SourceTable};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request did not complete in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status
    #[error("store rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be decoded
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// What happened to a single insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written
    Inserted,
    /// The store's uniqueness constraint already holds a row for this pair
    Duplicate,
}

/// Read/append access to the external store
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Username column of `table`, in store order. Absent values are `None`.
    async fn usernames(&self, table: SourceTable) -> StoreResult<Vec<Option<String>>>;

    /// Reviewer usernames of every review row whose reviewed username is
    /// exactly `reviewed_username`
    async fn reviewers_of(&self, reviewed_username: &str) -> StoreResult<Vec<String>>;

    /// Append one review row
    async fn insert_review(&self, assignment: &ReviewAssignment) -> StoreResult<InsertOutcome>;
}
