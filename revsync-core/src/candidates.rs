//! Candidate reviewer enumeration and the already-reviewed exclusion set

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::{ReviewedTarget, SourceTable};
use crate::store::ReviewStore;
use crate::{Error, Result};

/// Read every username from the users table, then the profiles table
///
/// Absent and empty usernames are dropped. Duplicates are kept: a person
/// present in both tables is a candidate twice.
pub async fn enumerate_candidates<S>(store: &S) -> Result<Vec<String>>
where
    S: ReviewStore + ?Sized,
{
    let mut candidates = Vec::new();

    for table in SourceTable::ALL {
        let rows = store.usernames(table).await.map_err(Error::StoreQuery)?;
        let before = candidates.len();
        candidates.extend(rows.into_iter().flatten().filter(|name| !name.is_empty()));
        debug!(%table, count = candidates.len() - before, "Enumerated usernames");
    }

    info!(total = candidates.len(), "Enumerated candidate reviewers");
    Ok(candidates)
}

/// Reviewer usernames that already have a review row for `target`
pub async fn already_reviewed<S>(store: &S, target: &ReviewedTarget) -> Result<HashSet<String>>
where
    S: ReviewStore + ?Sized,
{
    let reviewers: HashSet<String> = store
        .reviewers_of(&target.username)
        .await
        .map_err(Error::StoreQuery)?
        .into_iter()
        .collect();

    info!(
        target = %target.username,
        count = reviewers.len(),
        "Resolved existing reviewers"
    );
    Ok(reviewers)
}
