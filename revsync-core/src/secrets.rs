//! Secrets management for revsync
//!
//! The store credential is kept out of the config file. The secrets file is
//! located at `~/.config/revsync/secrets.toml` and must have restrictive
//! permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. `--store-key` / SUPABASE_KEY, resolved by the CLI layer
//! 2. Secrets file (~/.config/revsync/secrets.toml)
//!
//! Only the file half lives here. The process environment is read in one
//! place, the CLI argument parser, so the precedence above holds everywhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Secrets structure
///
/// `Debug` is implemented by hand so the key never reaches a log line.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// Store credentials
    pub store: StoreSecrets,
}

/// Store-related secrets
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSecrets {
    /// Supabase API key (anon or service role)
    ///
    /// Inserting review rows usually needs the service role key unless row
    /// level security allows anon inserts on the review table.
    pub key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("store_key", &self.store.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    ///
    /// On Unix the file is refused if anyone but the owner can read it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();

            // Check if file is readable by group or others (mode & 0o077)
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        // Trim whitespace from key
        if let Some(ref mut key) = secrets.store.key {
            *key = key.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/revsync/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revsync").join("secrets.toml"))
    }

    /// Get the store key from the secrets file
    ///
    /// Empty values count as missing so a blank template entry falls through
    /// to the "store key not found" error at resolve time.
    pub fn store_key(&self) -> Option<String> {
        match self.store.key {
            Some(ref key) if !key.is_empty() => {
                debug!("Using store key from secrets file");
                Some(key.clone())
            }
            _ => None,
        }
    }
}
