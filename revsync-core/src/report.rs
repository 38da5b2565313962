//! Single-line structured run report

use std::process::ExitCode;

use serde::Serialize;

use crate::engine::RunSummary;
use crate::Result;

/// Message printed with a successful summary
pub const COMPLETED_MESSAGE: &str = "Review assignment completed";

/// What the process prints on stdout when a run ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    #[serde(rename_all = "camelCase")]
    Completed {
        message: String,
        total_usernames: usize,
        inserted: usize,
        skipped: usize,
    },
    Failed {
        error: String,
    },
}

impl Report {
    pub fn completed(summary: &RunSummary) -> Self {
        Report::Completed {
            message: COMPLETED_MESSAGE.to_string(),
            total_usernames: summary.total,
            inserted: summary.inserted,
            skipped: summary.skipped_count(),
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Report::Failed {
            error: error.to_string(),
        }
    }

    pub fn from_result(result: Result<RunSummary>) -> Self {
        match result {
            Ok(summary) => Self::completed(&summary),
            Err(e) => Self::failed(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Report::Completed { .. })
    }

    /// 0 on success, 1 on failure
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Compact JSON, one line
    pub fn to_json_line(&self) -> String {
        // Only strings and integers: serialization cannot fail
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json_line())
    }
}
