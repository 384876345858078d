//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::aggregate::ViewLimits;
use crate::data::filter::FilterState;
use crate::report::ReportOptions;

/// Explore CORD-19 paper metadata: static chart report or interactive dashboard
///
/// Input is the `metadata.csv` file of the CORD-19 dataset (or any delimited
/// file with `title`, `abstract`, `publish_time`, `authors`, `journal` and
/// `source_x` columns). Set `RUST_LOG=debug` for more logging.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// What to do (defaults to the dashboard)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive dashboard window
    Dashboard(DashboardArgs),

    /// Render every chart once to PNG files, plus a JSON summary
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub struct DashboardArgs {
    /// Metadata file to open at startup (File → Open… otherwise)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Field delimiter, e.g. ',' ';' or 'tab' (default from the extension)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Metadata file to analyse
    #[arg(short, long, default_value = "metadata.csv")]
    pub data: PathBuf,

    /// Directory receiving the chart images and summary.json
    #[arg(short, long, default_value = "charts")]
    pub out_dir: PathBuf,

    /// Field delimiter, e.g. ',' ';' or 'tab' (default from the extension)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// First publish year to include
    #[arg(long)]
    pub year_from: Option<i32>,

    /// Last publish year to include
    #[arg(long)]
    pub year_to: Option<i32>,

    /// Only papers from this journal (exact name)
    #[arg(short, long)]
    pub journal: Option<String>,

    /// Leave out papers whose publish date is missing or unparsable
    #[arg(long)]
    pub exclude_undated: bool,

    /// Number of journals in the top-journals chart
    #[arg(long, default_value = "10")]
    pub top_journals: usize,

    /// Number of sources in the source chart
    #[arg(long, default_value = "20")]
    pub top_sources: usize,

    /// Number of words in the word cloud
    #[arg(long, default_value = "50")]
    pub top_words: usize,

    /// Image width in pixels
    #[arg(long, default_value = "1000")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,
}

impl ReportArgs {
    /// Digest the arguments into report options.
    ///
    /// `year_span` is the dataset's own year span, which fills in an open
    /// end of the year range. A range with `from > to` is swapped.
    pub fn to_options(&self, year_span: Option<(i32, i32)>) -> ReportOptions {
        let year_range = match (self.year_from, self.year_to) {
            (None, None) => None,
            (from, to) => {
                let (lo, hi) = year_span.unwrap_or((i32::MIN, i32::MAX));
                let from = from.unwrap_or(lo);
                let to = to.unwrap_or(hi);
                Some((from.min(to), from.max(to)))
            }
        };
        ReportOptions {
            out_dir: self.out_dir.clone(),
            filters: FilterState {
                year_range,
                journal: self.journal.clone(),
                include_undated: !self.exclude_undated,
            },
            limits: ViewLimits {
                top_journals: self.top_journals,
                top_sources: self.top_sources,
                top_words: self.top_words,
            },
            image_size: (self.width, self.height),
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character or 'tab', got {s:?}")),
        },
    }
}
