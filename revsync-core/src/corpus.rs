//! Review corpus loading
//!
//! The corpus is a headerless CSV resource. Only the first column is used;
//! rows whose first field is empty are dropped.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// The pool of review texts available for assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    reviews: Vec<String>,
}

impl Corpus {
    pub fn new(reviews: Vec<String>) -> Self {
        Self { reviews }
    }

    /// Parse a headerless CSV body, keeping the first column
    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(body);

        let mut reviews = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::Parse(format!("row {}: {}", row + 1, e)))?;
            match record.get(0) {
                Some(first) if !first.is_empty() => reviews.push(first.to_string()),
                _ => debug!(row = row + 1, "Dropping row with empty first column"),
            }
        }

        Ok(Self { reviews })
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn reviews(&self) -> &[String] {
        &self.reviews
    }

    /// Pick one review uniformly at random, with replacement
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.reviews.choose(rng).map(String::as_str)
    }
}

/// Somewhere a corpus can be loaded from
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn load(&self) -> Result<Corpus>;
}

#[async_trait]
impl CorpusSource for Corpus {
    async fn load(&self) -> Result<Corpus> {
        Ok(self.clone())
    }
}

/// Loads the corpus over HTTP(S) with a bounded timeout
#[derive(Debug, Clone)]
pub struct HttpCorpusSource {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpCorpusSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("revsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn network_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Network(format!(
                "corpus request to {} timed out after {:?}",
                self.url, self.timeout
            ))
        } else {
            Error::Network(format!("corpus request to {} failed: {}", self.url, err))
        }
    }
}

#[async_trait]
impl CorpusSource for HttpCorpusSource {
    async fn load(&self) -> Result<Corpus> {
        debug!(url = %self.url, timeout = ?self.timeout, "Fetching review corpus");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "corpus request to {} returned status {}",
                self.url, status
            )));
        }

        // Decoded using the charset from Content-Type, UTF-8 when absent
        let body = response.text().await.map_err(|e| self.network_error(e))?;
        let corpus = Corpus::parse(body.as_bytes())?;

        info!(reviews = corpus.len(), "Loaded review corpus");
        Ok(corpus)
    }
}
