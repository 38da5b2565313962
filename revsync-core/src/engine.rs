//! Assignment engine
//!
//! Walks the candidate list in order, skips the target itself and anyone who
//! has already reviewed it, and writes one review row per remaining
//! candidate with a review text drawn at random from the corpus.

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::corpus::Corpus;
use crate::models::{ReviewAssignment, ReviewedTarget};
use crate::store::{InsertOutcome, ReviewStore};
use crate::{Error, Result};

/// Why a candidate did not receive a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Candidate is the reviewed target (case-insensitive)
    SelfReview,
    /// Candidate already has a review row for the target
    AlreadyReviewed,
    /// The store's uniqueness constraint rejected the row
    Duplicate,
}

/// A candidate that was not inserted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub username: String,
    pub reason: SkipReason,
}

/// Outcome of a completed run
///
/// `inserted + skipped.len() == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Candidates considered
    pub total: usize,
    /// Rows written
    pub inserted: usize,
    /// Candidates passed over, in processing order
    pub skipped: Vec<Skipped>,
}

impl RunSummary {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Skips with the given reason
    pub fn count_skipped(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Decides and writes assignments for one run
pub struct AssignmentEngine<'a, S: ?Sized, R> {
    store: &'a S,
    target: &'a ReviewedTarget,
    rng: R,
}

impl<'a, S, R> AssignmentEngine<'a, S, R>
where
    S: ReviewStore + ?Sized,
    R: Rng,
{
    pub fn new(store: &'a S, target: &'a ReviewedTarget, rng: R) -> Self {
        Self { store, target, rng }
    }

    /// Classify a candidate without touching the store
    pub fn skip_reason(&self, candidate: &str, already: &HashSet<String>) -> Option<SkipReason> {
        if self.target.is_self(candidate) {
            Some(SkipReason::SelfReview)
        } else if already.contains(candidate) {
            Some(SkipReason::AlreadyReviewed)
        } else {
            None
        }
    }

    /// Process every candidate in order
    ///
    /// Fails with [`Error::EmptyCorpus`] before any write when there is
    /// nothing to assign, and with [`Error::StoreWrite`] on the first failed
    /// insert, carrying the number of rows already written.
    pub async fn assign(
        &mut self,
        candidates: &[String],
        already: &HashSet<String>,
        corpus: &Corpus,
    ) -> Result<RunSummary> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut summary = RunSummary {
            total: candidates.len(),
            ..RunSummary::default()
        };

        for candidate in candidates {
            if let Some(reason) = self.skip_reason(candidate, already) {
                debug!(reviewer = %candidate, ?reason, "Skipping candidate");
                summary.skipped.push(Skipped {
                    username: candidate.clone(),
                    reason,
                });
                continue;
            }

            let review = corpus.choose(&mut self.rng).ok_or(Error::EmptyCorpus)?;
            let assignment = ReviewAssignment::new(&self.target.username, candidate, review);

            let outcome = self
                .store
                .insert_review(&assignment)
                .await
                .map_err(|source| Error::StoreWrite {
                    inserted: summary.inserted,
                    source,
                })?;

            match outcome {
                InsertOutcome::Inserted => {
                    debug!(reviewer = %candidate, "Inserted review");
                    summary.inserted += 1;
                }
                InsertOutcome::Duplicate => {
                    warn!(
                        reviewer = %candidate,
                        target = %self.target.username,
                        "Review already exists in store, skipping"
                    );
                    summary.skipped.push(Skipped {
                        username: candidate.clone(),
                        reason: SkipReason::Duplicate,
                    });
                }
            }
        }

        info!(
            total = summary.total,
            inserted = summary.inserted,
            skipped = summary.skipped_count(),
            "Assignment pass finished"
        );
        Ok(summary)
    }
}
