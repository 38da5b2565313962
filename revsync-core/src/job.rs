//! The review assignment job: load, enumerate, resolve, assign

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::candidates::{already_reviewed, enumerate_candidates};
use crate::corpus::CorpusSource;
use crate::engine::{AssignmentEngine, RunSummary};
use crate::models::ReviewedTarget;
use crate::store::ReviewStore;
use crate::{Error, Result};

/// One sequential pass over the store for a single target
pub struct ReviewJob<'a, C: ?Sized, S: ?Sized> {
    target: &'a ReviewedTarget,
    corpus: &'a C,
    store: &'a S,
}

impl<'a, C, S> ReviewJob<'a, C, S>
where
    C: CorpusSource + ?Sized,
    S: ReviewStore + ?Sized,
{
    pub fn new(target: &'a ReviewedTarget, corpus: &'a C, store: &'a S) -> Self {
        Self {
            target,
            corpus,
            store,
        }
    }

    /// Run with an entropy-seeded RNG
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_rng(StdRng::from_entropy()).await
    }

    /// Run with the given RNG for review selection
    ///
    /// Any error aborts the pass. An empty corpus is rejected before the
    /// store is touched.
    pub async fn run_with_rng<R: Rng>(&self, rng: R) -> Result<RunSummary> {
        info!(
            target = %self.target.username,
            email = %self.target.email,
            "Starting review assignment"
        );

        let corpus = self.corpus.load().await?;
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let candidates = enumerate_candidates(self.store).await?;
        let already = already_reviewed(self.store, self.target).await?;

        let mut engine = AssignmentEngine::new(self.store, self.target, rng);
        let summary = engine.assign(&candidates, &already, &corpus).await?;
        Ok(summary)
    }
}
