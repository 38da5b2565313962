//! Revsync Core - Core library for revsync review assignment
//!
//! This crate provides the domain model and the single-pass job that assigns
//! a random review text to every known user who has not yet reviewed the
//! configured target account.

pub mod candidates;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod job;
pub mod models;
pub mod report;
pub mod secrets;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{Config, RunConfig, StoreSettings};
pub use corpus::{Corpus, CorpusSource, HttpCorpusSource};
pub use engine::{AssignmentEngine, RunSummary, SkipReason, Skipped};
pub use error::{Error, Result};
pub use job::ReviewJob;
pub use models::{ReviewAssignment, ReviewedTarget, SourceTable};
pub use report::Report;
pub use secrets::Secrets;
pub use store::{InsertOutcome, ReviewStore, StoreError, StoreResult};
