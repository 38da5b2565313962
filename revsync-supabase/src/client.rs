//! Supabase REST client using reqwest

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use revsync_core::{SourceTable, StoreError, StoreSettings};
use tracing::info;
use url::Url;

use crate::{Error, Result};

/// PostgREST client for one Supabase project
pub struct SupabaseClient {
    http: reqwest::Client,
    rest_base: Url,
    timeout: Duration,
    users_table: String,
    profiles_table: String,
    reviews_table: String,
    page_size: usize,
}

impl SupabaseClient {
    /// Create a client from resolved store settings
    ///
    /// Every request carries the key as both `apikey` and bearer token and is
    /// bounded by the configured timeout.
    pub fn new(settings: &StoreSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&settings.key)
            .map_err(|e| Error::Auth(format!("store key is not a valid header value: {}", e)))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", settings.key))
            .map_err(|e| Error::Auth(format!("store key is not a valid header value: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .user_agent(concat!("revsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let rest_base = rest_endpoint(&settings.url)?;

        info!(endpoint = %rest_base, "Created Supabase client");

        Ok(Self {
            http,
            rest_base,
            timeout: settings.timeout,
            users_table: settings.users_table.clone(),
            profiles_table: settings.profiles_table.clone(),
            reviews_table: settings.reviews_table.clone(),
            page_size: settings.page_size,
        })
    }

    /// Get the underlying HTTP client
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// PostgREST base, e.g. `https://project.supabase.co/rest/v1/`
    pub fn rest_base(&self) -> &Url {
        &self.rest_base
    }

    /// Store table backing a candidate source
    pub fn source_table(&self, table: SourceTable) -> &str {
        match table {
            SourceTable::Users => &self.users_table,
            SourceTable::Profiles => &self.profiles_table,
        }
    }

    pub fn reviews_table(&self) -> &str {
        &self.reviews_table
    }

    /// Rows requested per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn table_url(&self, table: &str) -> Result<Url> {
        table_url(&self.rest_base, table)
    }

    /// Convert to the store seam's error, naming our timeout
    pub(crate) fn store_error(&self, err: Error) -> StoreError {
        match err {
            Error::Http(e) if e.is_timeout() => StoreError::Timeout(self.timeout),
            other => other.into(),
        }
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_base", &self.rest_base.as_str())
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Append `rest/v1/` to the project URL, keeping any existing path prefix
fn rest_endpoint(project: &Url) -> Result<Url> {
    let mut base = project.clone();
    base.set_query(None);
    base.set_fragment(None);

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("rest/v1/").map_err(|e| Error::Url(e.to_string()))
}

fn table_url(rest_base: &Url, table: &str) -> Result<Url> {
    let mut url = rest_base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Url(format!("{} cannot be a base URL", rest_base)))?
        .pop_if_empty()
        .push(table);
    Ok(url)
}
