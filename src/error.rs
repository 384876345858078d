use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can go wrong between reading the CSV and drawing a chart.
#[derive(Debug, Error)]
pub enum ExploreError {
    /// The input file is missing, unreadable or not delimited text.
    /// Fatal at startup.
    #[error("data unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// A view has no rows left after filtering. Shown as an empty state.
    #[error("no data for view '{view}'")]
    EmptyInput { view: String },

    /// A single cell could not be parsed and was replaced by null.
    #[error("row {row}: could not parse {column} value '{value}', using null")]
    MalformedField {
        row: usize,
        column: &'static str,
        value: String,
    },
}

impl ExploreError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ExploreError::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn empty(view: impl Into<String>) -> Self {
        ExploreError::EmptyInput { view: view.into() }
    }

    /// Whether the caller can carry on (show "no data", skip a chart).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ExploreError::DataUnavailable { .. })
    }
}

pub type ExploreResult<T> = Result<T, ExploreError>;
