use serde::Serialize;

use super::model::{Dataset, PaperRecord};

// ---------------------------------------------------------------------------
// Filter configuration: the only mutable state of the dashboard
// ---------------------------------------------------------------------------

/// Which papers are visible. Passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// Inclusive `(from, to)` publish-year range. `None` → no constraint on
    /// dated papers.
    pub year_range: Option<(i32, i32)>,
    /// Exact journal name. `None` → all journals.
    pub journal: Option<String>,
    /// Whether papers without a parseable publish date pass the filter.
    pub include_undated: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            year_range: None,
            journal: None,
            include_undated: true,
        }
    }
}

impl FilterState {
    /// Start with everything visible, year range spanning the dataset.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            year_range: dataset.year_span,
            ..Self::default()
        }
    }

    /// Whether a single paper passes every active constraint.
    ///
    /// * the year range only applies to dated papers; undated ones pass
    ///   iff `include_undated`
    /// * the journal constraint rejects papers with no journal
    pub fn accepts(&self, paper: &PaperRecord) -> bool {
        let year_ok = match (paper.year(), self.year_range) {
            (None, _) => self.include_undated,
            (Some(_), None) => true,
            (Some(y), Some((from, to))) => from <= y && y <= to,
        };
        let journal_ok = match &self.journal {
            None => true,
            Some(wanted) => paper.journal.as_deref() == Some(wanted.as_str()),
        };
        year_ok && journal_ok
    }

    /// Short human-readable description, used in chart captions.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some((from, to)) = self.year_range {
            if from == to {
                parts.push(format!("{from}"));
            } else {
                parts.push(format!("{from}-{to}"));
            }
        }
        if let Some(journal) = &self.journal {
            parts.push(journal.clone());
        }
        if !self.include_undated {
            parts.push("dated only".to_string());
        }
        if parts.is_empty() {
            "all papers".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Return indices of papers that pass the filter, in dataset order.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, paper)| filters.accepts(paper))
        .map(|(i, _)| i)
        .collect()
}
