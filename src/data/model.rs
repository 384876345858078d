use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column – the recognised subset of the CORD-19 metadata header
// ---------------------------------------------------------------------------

/// A column the loader knows about. Anything else in the file is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Title,
    Abstract,
    PublishTime,
    Authors,
    Journal,
    Source,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Title,
        Column::Abstract,
        Column::PublishTime,
        Column::Authors,
        Column::Journal,
        Column::Source,
    ];

    /// Canonical name, used in log messages and errors.
    pub fn name(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::Abstract => "abstract",
            Column::PublishTime => "publish_time",
            Column::Authors => "authors",
            Column::Journal => "journal",
            Column::Source => "source",
        }
    }

    /// Header spellings accepted for this column, in priority order.
    /// Matching is done on trimmed, lower-cased header cells.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Title => &["title"],
            Column::Abstract => &["abstract"],
            Column::PublishTime => &["publish_time", "publish_date", "publish date"],
            Column::Authors => &["authors"],
            Column::Journal => &["journal"],
            Column::Source => &["source_x", "source"],
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord / RawDataset – loader output
// ---------------------------------------------------------------------------

/// One CSV row, restricted to the recognised columns.
/// Empty or whitespace-only cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub publish_time: Option<String>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub source: Option<String>,
}

impl RawRecord {
    pub fn field_mut(&mut self, column: Column) -> &mut Option<String> {
        match column {
            Column::Title => &mut self.title,
            Column::Abstract => &mut self.abstract_text,
            Column::PublishTime => &mut self.publish_time,
            Column::Authors => &mut self.authors,
            Column::Journal => &mut self.journal,
            Column::Source => &mut self.source,
        }
    }
}

/// The file as read, before any cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub records: Vec<RawRecord>,
    /// Recognised columns that were present in the header.
    pub columns: BTreeSet<Column>,
    /// Cells that were not valid UTF-8 and were read as null.
    pub malformed_cells: usize,
}

impl RawDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PublishDate – canonical (possibly partial) date
// ---------------------------------------------------------------------------

/// How much of the original date string was actually known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// A publish date. Partial dates are truncated to the first day of their
/// period, so `date.year()` is always meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishDate {
    pub date: NaiveDate,
    pub precision: DatePrecision,
}

impl PublishDate {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            DatePrecision::Year => write!(f, "{}", self.date.format("%Y")),
            DatePrecision::Month => write!(f, "{}", self.date.format("%Y-%m")),
            DatePrecision::Day => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

// ---------------------------------------------------------------------------
// PaperRecord / Dataset – cleaner output
// ---------------------------------------------------------------------------

/// A cleaned paper. `title` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperRecord {
    pub title: String,
    pub abstract_text: Option<String>,
    pub publish_date: Option<PublishDate>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub source: Option<String>,
    /// Whitespace-separated tokens in the abstract (0 when missing).
    pub abstract_word_count: usize,
}

impl PaperRecord {
    pub fn year(&self) -> Option<i32> {
        self.publish_date.map(|d| d.year())
    }
}

/// The cleaned, immutable dataset with a few pre-computed indices for the UI.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<PaperRecord>,
    /// Distinct journal names, sorted.
    pub journals: BTreeSet<String>,
    /// Earliest and latest publish year, if any record is dated.
    pub year_span: Option<(i32, i32)>,
}

impl Dataset {
    /// Build indices from the cleaned records.
    pub fn from_records(records: Vec<PaperRecord>) -> Self {
        let journals = records
            .iter()
            .filter_map(|r| r.journal.clone())
            .collect();
        let year_span = records.iter().filter_map(PaperRecord::year).fold(
            None,
            |span: Option<(i32, i32)>, y| match span {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            },
        );
        Dataset {
            records,
            journals,
            year_span,
        }
    }

    /// Number of papers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records at the given indices, in index order.
    pub fn select<'a>(
        &'a self,
        indices: &'a [usize],
    ) -> impl Iterator<Item = &'a PaperRecord> + 'a {
        indices.iter().filter_map(move |&i| self.records.get(i))
    }
}
