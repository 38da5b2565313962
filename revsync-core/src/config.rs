//! Configuration management for revsync
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI overrides (the binary fills these from flags or SUPABASE_URL / CSV_URL)
//! 2. Config file (~/.config/revsync/config.toml)
//! 3. Default values
//!
//! This module never reads the process environment itself; the CLI layer is
//! the only place environment variables are consulted.
//!
//! The store credential is not part of this file; see [`crate::secrets`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::ReviewedTarget;
use crate::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Matches Supabase's default `max-rows`
const DEFAULT_PAGE_SIZE: usize = 1000;

/// External store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the Supabase project
    pub url: Option<String>,

    /// Per-request timeout for reads and inserts
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Table holding application users
    pub users_table: String,

    /// Table holding linked Instagram profiles
    pub profiles_table: String,

    /// Table holding review rows
    pub reviews_table: String,

    /// Rows requested per read; reads page until the reported count is reached
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: DEFAULT_TIMEOUT,
            users_table: "user".to_string(),
            profiles_table: "instagramProfile".to_string(),
            reviews_table: "review".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Review corpus configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// HTTP(S) location of the headerless CSV
    pub url: Option<String>,

    /// Download timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub corpus: CorpusConfig,
    pub target: ReviewedTarget,
}

/// Resolved store connection settings
#[derive(Clone)]
pub struct StoreSettings {
    pub url: Url,
    pub key: String,
    pub timeout: Duration,
    pub users_table: String,
    pub profiles_table: String,
    pub reviews_table: String,
    pub page_size: usize,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("url", &self.url.as_str())
            .field("key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("users_table", &self.users_table)
            .field("profiles_table", &self.profiles_table)
            .field("reviews_table", &self.reviews_table)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Validated, immutable settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub store: StoreSettings,
    pub corpus_url: Url,
    pub corpus_timeout: Duration,
    pub target: ReviewedTarget,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/revsync/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revsync").join("config.toml"))
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, store_url: Option<String>, corpus_url: Option<String>) -> Self {
        if let Some(url) = store_url {
            self.store.url = Some(url);
        }

        if let Some(url) = corpus_url {
            self.corpus.url = Some(url);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > config file > defaults. An explicit `path` must
    /// exist; the default location may be absent.
    pub fn load_with_overrides(
        path: Option<&Path>,
        store_url: Option<String>,
        corpus_url: Option<String>,
    ) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base.with_cli_overrides(store_url, corpus_url))
    }

    /// Validate and freeze into the settings handed to every component
    pub fn resolve(self, store_key: Option<String>) -> Result<RunConfig> {
        let store_url = require_http_url("store URL (SUPABASE_URL)", self.store.url.as_deref())?;
        let corpus_url = require_http_url("corpus URL (CSV_URL)", self.corpus.url.as_deref())?;

        let key = store_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "store key not found. Set SUPABASE_KEY environment variable \
                     or add it to ~/.config/revsync/secrets.toml"
                        .to_string(),
                )
            })?;

        if self.store.timeout.is_zero() || self.corpus.timeout.is_zero() {
            return Err(Error::Config("timeouts must be greater than zero".to_string()));
        }

        for (name, table) in [
            ("store.users_table", &self.store.users_table),
            ("store.profiles_table", &self.store.profiles_table),
            ("store.reviews_table", &self.store.reviews_table),
        ] {
            if table.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }

        if self.store.page_size == 0 {
            return Err(Error::Config("store.page_size must be greater than zero".to_string()));
        }

        if self.target.username.is_empty() {
            return Err(Error::Config("target.username must not be empty".to_string()));
        }

        Ok(RunConfig {
            store: StoreSettings {
                url: store_url,
                key,
                timeout: self.store.timeout,
                users_table: self.store.users_table,
                profiles_table: self.store.profiles_table,
                reviews_table: self.store.reviews_table,
                page_size: self.store.page_size,
            },
            corpus_url,
            corpus_timeout: self.corpus.timeout,
            target: self.target,
        })
    }
}

fn require_http_url(name: &str, value: Option<&str>) -> Result<Url> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("missing {}", name)))?;

    let url = Url::parse(value).map_err(|e| Error::Config(format!("invalid {}: {}", name, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "invalid {}: unsupported scheme '{}'",
            name, other
        ))),
    }
}
