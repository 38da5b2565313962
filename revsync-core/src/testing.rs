//! Test doubles: an in-memory store and a one-response HTTP server

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

use crate::models::{ReviewAssignment, SourceTable};
use crate::store::{InsertOutcome, ReviewStore, StoreError, StoreResult};

#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Vec<Option<String>>,
    profiles: Vec<Option<String>>,
    reviews: Mutex<Vec<ReviewAssignment>>,
    failing_table: Option<SourceTable>,
    failing_review_reads: bool,
    insert_limit: Option<usize>,
    unique: bool,
    insert_attempts: Mutex<usize>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_users<const N: usize>(self, users: [&str; N]) -> Self {
        self.with_user_rows(users.iter().map(|u| Some(u.to_string())).collect())
    }

    pub(crate) fn with_profiles<const N: usize>(self, profiles: [&str; N]) -> Self {
        self.with_profile_rows(profiles.iter().map(|p| Some(p.to_string())).collect())
    }

    pub(crate) fn with_user_rows(mut self, rows: Vec<Option<String>>) -> Self {
        self.users = rows;
        self
    }

    pub(crate) fn with_profile_rows(mut self, rows: Vec<Option<String>>) -> Self {
        self.profiles = rows;
        self
    }

    pub(crate) fn with_reviews<const N: usize>(self, rows: [ReviewAssignment; N]) -> Self {
        self.reviews
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(rows);
        self
    }

    pub(crate) fn failing_reads_from(mut self, table: SourceTable) -> Self {
        self.failing_table = Some(table);
        self
    }

    pub(crate) fn failing_review_reads(mut self) -> Self {
        self.failing_review_reads = true;
        self
    }

    /// Accept `limit` inserts, then fail every following one
    pub(crate) fn failing_insert_after(mut self, limit: usize) -> Self {
        self.insert_limit = Some(limit);
        self
    }

    /// Reject a second row for the same (reviewed, reviewer) pair
    pub(crate) fn with_unique_constraint(mut self) -> Self {
        self.unique = true;
        self
    }

    pub(crate) fn reviews(&self) -> Vec<ReviewAssignment> {
        self.reviews.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn insert_attempts(&self) -> usize {
        *self.insert_attempts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn usernames(&self, table: SourceTable) -> StoreResult<Vec<Option<String>>> {
        if self.failing_table == Some(table) {
            return Err(StoreError::Transport(format!("{} table unavailable", table)));
        }
        Ok(match table {
            SourceTable::Users => self.users.clone(),
            SourceTable::Profiles => self.profiles.clone(),
        })
    }

    async fn reviewers_of(&self, reviewed_username: &str) -> StoreResult<Vec<String>> {
        if self.failing_review_reads {
            return Err(StoreError::Rejected {
                status: 500,
                message: "review table unavailable".to_string(),
            });
        }
        Ok(self
            .reviews()
            .into_iter()
            .filter(|r| r.reviewed_username == reviewed_username)
            .map(|r| r.reviewer_username)
            .collect())
    }

    async fn insert_review(&self, assignment: &ReviewAssignment) -> StoreResult<InsertOutcome> {
        *self.insert_attempts.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        let mut reviews = self.reviews.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(limit) = self.insert_limit {
            if reviews.len() >= limit {
                return Err(StoreError::Rejected {
                    status: 503,
                    message: "insert refused".to_string(),
                });
            }
        }
        if self.unique
            && reviews.iter().any(|r| {
                r.reviewed_username == assignment.reviewed_username
                    && r.reviewer_username == assignment.reviewer_username
            })
        {
            return Ok(InsertOutcome::Duplicate);
        }
        reviews.push(assignment.clone());
        Ok(InsertOutcome::Inserted)
    }
}

/// Canned response returned by [`StubServer`] for every request
#[derive(Debug, Clone)]
pub(crate) struct StubResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    delay: Option<Duration>,
}

impl StubResponse {
    pub(crate) fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
        }
    }

    pub(crate) fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Wait before answering
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");

        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason);
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Local HTTP/1.1 listener answering every request with one response
pub(crate) struct StubServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl StubServer {
    pub(crate) async fn serve(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    if read_head(&mut stream).await.is_err() {
                        return;
                    }
                    if let Some(delay) = response.delay {
                        tokio::time::sleep(delay).await;
                    }
                    let _ = stream.write_all(&response.to_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, task }
    }

    pub(crate) fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read up to the blank line ending the request head
async fn read_head(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}
