//! Data models shared by the loader, the store seam and the engine

use serde::{Deserialize, Serialize};

/// The fixed account every generated review is written for
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewedTarget {
    /// Username of the reviewed account
    pub username: String,

    /// Contact email of the reviewed account
    pub email: String,
}

impl ReviewedTarget {
    /// Create a new target
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }

    /// Whether `candidate` is this account, ignoring case
    pub fn is_self(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.username.to_lowercase()
    }
}

impl Default for ReviewedTarget {
    fn default() -> Self {
        Self::new("air", "Ceokhan@gmail.com")
    }
}

/// The two tables candidate reviewers are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    /// Generic application users
    Users,
    /// Linked Instagram profiles
    Profiles,
}

impl SourceTable {
    /// Enumeration order: users first, then profiles
    pub const ALL: [SourceTable; 2] = [SourceTable::Users, SourceTable::Profiles];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTable::Users => "users",
            SourceTable::Profiles => "profiles",
        }
    }
}

impl std::fmt::Display for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted review row binding a reviewer to the target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewAssignment {
    /// Account being reviewed
    pub reviewed_username: String,

    /// Account credited with the review
    pub reviewer_username: String,

    /// Review text drawn from the corpus
    pub review: String,
}

impl ReviewAssignment {
    pub fn new(
        reviewed_username: impl Into<String>,
        reviewer_username: impl Into<String>,
        review: impl Into<String>,
    ) -> Self {
        Self {
            reviewed_username: reviewed_username.into(),
            reviewer_username: reviewer_username.into(),
            review: review.into(),
        }
    }
}
