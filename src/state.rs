use std::path::{Path, PathBuf};

use crate::data::aggregate::{
    compute_views, summarize, AggregateResult, GroupKey, Summary, ViewLimits,
};
use crate::data::clean::CleanOutcome;
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::load_dataset;
use crate::data::model::{Dataset, PaperRecord};
use crate::report::{self, ReportOptions};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// File the dataset was read from.
    pub source_path: Option<PathBuf>,

    /// Delimiter override used when opening files.
    pub delimiter: Option<u8>,

    /// Current filter selection. The only state the user mutates.
    pub filters: FilterState,

    /// How many entries the ranked views keep.
    pub limits: ViewLimits,

    /// Indices of papers passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible papers, recomputed on every filter change.
    pub views: Vec<(GroupKey, AggregateResult)>,

    /// Summary statistics of the visible papers.
    pub summary: Summary,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            source_path: None,
            delimiter: None,
            filters: FilterState::default(),
            limits: ViewLimits::default(),
            visible_indices: Vec::new(),
            views: Vec::new(),
            summary: Summary::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly cleaned dataset and reset filters to show everything.
    pub fn set_dataset(&mut self, outcome: CleanOutcome, path: &Path) {
        let CleanOutcome {
            dataset,
            dropped_untitled,
            malformed_dates,
            malformed_cells,
        } = outcome;
        self.filters = FilterState::for_dataset(&dataset);
        self.status_message = if dataset.is_empty() {
            Some(format!("No titled papers in {}", path.display()))
        } else {
            let mut notes = Vec::new();
            if dropped_untitled > 0 {
                notes.push(format!("Dropped {dropped_untitled} rows without title"));
            }
            if malformed_dates > 0 {
                notes.push(format!("{malformed_dates} dates unreadable"));
            }
            if malformed_cells > 0 {
                notes.push(format!("{malformed_cells} cells undecodable"));
            }
            (!notes.is_empty()).then(|| notes.join(", "))
        };
        self.dataset = Some(dataset);
        self.source_path = Some(path.to_path_buf());
        self.refilter();
    }

    /// Load and clean a file. Failures are reported in the status line and
    /// leave the current dataset in place.
    pub fn open(&mut self, path: &Path) {
        match load_dataset(path, self.delimiter) {
            Ok(outcome) => {
                log::info!(
                    "Loaded {} papers from {}",
                    outcome.dataset.len(),
                    path.display()
                );
                self.set_dataset(outcome, path);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute visible papers, views and summary from scratch.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filters);
        let records: Vec<&PaperRecord> = ds.select(&self.visible_indices).collect();
        self.views = compute_views(&records, &self.limits);
        self.summary = summarize(records.iter().copied());
        log::debug!(
            "Filters {:?}: {} of {} papers visible",
            self.filters,
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// Replace the filter selection, re-aggregating only when it changed.
    pub fn set_filters(&mut self, filters: FilterState) {
        if filters != self.filters {
            self.filters = filters;
            self.refilter();
        }
    }

    /// Set the inclusive year range; the bounds are reordered if needed.
    pub fn set_year_range(&mut self, from: i32, to: i32) {
        let filters = FilterState {
            year_range: Some((from.min(to), from.max(to))),
            ..self.filters.clone()
        };
        self.set_filters(filters);
    }

    /// Select a single journal, or all journals with `None`.
    pub fn set_journal(&mut self, journal: Option<String>) {
        let filters = FilterState {
            journal,
            ..self.filters.clone()
        };
        self.set_filters(filters);
    }

    pub fn set_include_undated(&mut self, include: bool) {
        let filters = FilterState {
            include_undated: include,
            ..self.filters.clone()
        };
        self.set_filters(filters);
    }

    /// Back to "everything visible".
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            let filters = FilterState::for_dataset(ds);
            self.set_filters(filters);
        }
    }

    /// Aggregate for one view, if a dataset is loaded.
    pub fn view(&self, key: GroupKey) -> Option<&AggregateResult> {
        self.views.iter().find(|(k, _)| *k == key).map(|(_, r)| r)
    }

    /// The first `n` visible papers, in file order.
    pub fn sample_rows(&self, n: usize) -> Vec<&PaperRecord> {
        match &self.dataset {
            Some(ds) => ds.select(&self.visible_indices).take(n).collect(),
            None => Vec::new(),
        }
    }

    /// Write the static report for the current filters into `out_dir`.
    pub fn export_charts(&mut self, out_dir: &Path) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let options = ReportOptions {
            out_dir: out_dir.to_path_buf(),
            filters: self.filters.clone(),
            limits: self.limits,
            ..ReportOptions::default()
        };
        self.status_message = Some(match report::write_charts(ds, &options) {
            Ok(outcome) => format!(
                "Exported {} charts to {}",
                outcome.written.len(),
                out_dir.display()
            ),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Export failed: {e:#}")
            }
        });
    }
}
