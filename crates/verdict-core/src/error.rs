//! Load and normalization failures.
//!
//! All three are terminal for the current load attempt. Callers log the
//! detail and show the generic failure screen
//! ([`crate::dashboard::render_failure`]); nothing is retried.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Network error, non-success status, or unreadable local file.
    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// The report collection was empty or absent.
    #[error("no report found in {location}")]
    EmptyReport { location: String },

    /// The report is missing `steps` or does not decode at all.
    #[error("malformed report: {reason}")]
    MalformedReport { reason: String },
}

impl ReportError {
    pub fn fetch(location: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::Fetch {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn empty(location: impl Into<String>) -> Self {
        ReportError::EmptyReport {
            location: location.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        ReportError::MalformedReport {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for robot output.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Fetch { .. } => "FETCH_ERROR",
            ReportError::EmptyReport { .. } => "EMPTY_REPORT",
            ReportError::MalformedReport { .. } => "MALFORMED_REPORT",
        }
    }
}
