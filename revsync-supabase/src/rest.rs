//! PostgREST reads and inserts backing the review store

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Response, StatusCode};
use revsync_core::{InsertOutcome, ReviewAssignment, ReviewStore, SourceTable, StoreResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, SupabaseClient};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Deserialize)]
struct UsernameRow {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewerRow {
    #[serde(default)]
    reviewer_username: Option<String>,
}

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl PostgrestError {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn is_unique_violation(&self, status: StatusCode) -> bool {
        match self.code.as_deref() {
            Some(code) => code == UNIQUE_VIOLATION,
            None => status == StatusCode::CONFLICT,
        }
    }

    fn describe(&self, status: StatusCode, body: &str) -> String {
        match (&self.message, &self.details) {
            (Some(message), Some(details)) => format!("{} ({})", message, details),
            (Some(message), None) => message.clone(),
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

/// `Content-Range` of a counted read, e.g. `0-999/1500` or `*/0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContentRange {
    /// First row in the page, `None` for an empty page
    start: Option<usize>,
    /// Exact row count, `None` when the server answered `*`
    total: Option<usize>,
}

impl ContentRange {
    fn parse(value: &str) -> Option<Self> {
        let (range, total) = value.trim().split_once('/')?;

        let start = match range {
            "*" => None,
            range => Some(range.split_once('-')?.0.parse().ok()?),
        };
        let total = match total {
            "*" => None,
            total => Some(total.parse().ok()?),
        };

        Some(Self { start, total })
    }
}

fn decode_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    serde_json::from_str(body).map_err(|e| Error::Parse(format!("Failed to decode rows: {}", e)))
}

async fn status_error(response: Response) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response".to_string());
    let message = PostgrestError::parse(&body).describe(status, &body);
    Error::Status {
        status: status.as_u16(),
        message,
    }
}

impl SupabaseClient {
    /// GET every row of `table`, one page at a time
    ///
    /// PostgREST silently caps a response at its `max-rows` setting, so rows
    /// are read in `order` with `offset`/`limit` and the running count is
    /// checked against the exact total from `Content-Range`. A page that does
    /// not start where it was asked to, or a read that ends short of the
    /// total, is an error rather than a partial result.
    async fn select_all<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        order: &str,
    ) -> Result<Vec<T>> {
        let url = self.table_url(table)?;
        let limit = self.page_size();
        let order = format!("{}.asc", order);
        let mut rows: Vec<T> = Vec::new();

        loop {
            let offset = rows.len();
            debug!(%url, ?query, offset, limit, "Selecting rows");

            let response = self
                .http()
                .get(url.clone())
                .query(query)
                .query(&[
                    ("order", order.clone()),
                    ("offset", offset.to_string()),
                    ("limit", limit.to_string()),
                ])
                .header("Prefer", "count=exact")
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(status_error(response).await);
            }

            let raw_range = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let range = ContentRange::parse(&raw_range).ok_or_else(|| {
                Error::Parse(format!(
                    "{} response carried no usable Content-Range header",
                    table
                ))
            })?;
            let total = range.total.ok_or_else(|| {
                Error::Parse(format!("{} row count was not reported ({})", table, raw_range))
            })?;

            let body = response.text().await?;
            let page: Vec<T> = decode_rows(&body)?;
            let fetched = page.len();

            if fetched > 0 && range.start != Some(offset) {
                return Err(Error::Parse(format!(
                    "{} page requested at row {} came back as {}",
                    table, offset, raw_range
                )));
            }

            rows.extend(page);

            if rows.len() > total {
                return Err(Error::Parse(format!(
                    "{} returned {} rows but reported {}",
                    table,
                    rows.len(),
                    total
                )));
            }
            if rows.len() == total {
                break;
            }
            if fetched == 0 {
                return Err(Error::Parse(format!(
                    "{} read stopped at {} of {} rows",
                    table,
                    rows.len(),
                    total
                )));
            }
        }

        debug!(table, rows = rows.len(), "Selected all rows");
        Ok(rows)
    }

    /// POST one row into `table`
    async fn insert<T: Serialize + ?Sized>(&self, table: &str, row: &T) -> Result<InsertOutcome> {
        let url = self.table_url(table)?;

        let response = self
            .http()
            .post(url)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(InsertOutcome::Inserted);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());
        let error = PostgrestError::parse(&body);

        if error.is_unique_violation(status) {
            debug!(table, "Insert hit uniqueness constraint");
            return Ok(InsertOutcome::Duplicate);
        }

        Err(Error::Status {
            status: status.as_u16(),
            message: error.describe(status, &body),
        })
    }
}

#[async_trait]
impl ReviewStore for SupabaseClient {
    async fn usernames(&self, table: SourceTable) -> StoreResult<Vec<Option<String>>> {
        let rows: Vec<UsernameRow> = self
            .select_all(
                self.source_table(table),
                &[("select", "username".to_string())],
                "username",
            )
            .await
            .map_err(|e| self.store_error(e))?;

        Ok(rows.into_iter().map(|r| r.username).collect())
    }

    async fn reviewers_of(&self, reviewed_username: &str) -> StoreResult<Vec<String>> {
        let query = [
            ("select", "reviewer_username".to_string()),
            ("reviewed_username", format!("eq.{}", reviewed_username)),
        ];

        let rows: Vec<ReviewerRow> = self
            .select_all(self.reviews_table(), &query, "reviewer_username")
            .await
            .map_err(|e| self.store_error(e))?;

        Ok(rows.into_iter().filter_map(|r| r.reviewer_username).collect())
    }

    async fn insert_review(&self, assignment: &ReviewAssignment) -> StoreResult<InsertOutcome> {
        self.insert(self.reviews_table(), assignment)
            .await
            .map_err(|e| self.store_error(e))
    }
}
