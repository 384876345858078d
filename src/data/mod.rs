/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  metadata.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawDataset (recognised columns only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  parse dates, drop untitled rows → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  (key, count) pairs, summary statistics
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;

use std::path::Path;

use crate::error::ExploreResult;

use self::clean::CleanOutcome;

/// Load and clean in one go, as both the report and the dashboard do.
pub fn load_dataset(path: &Path, delimiter: Option<u8>) -> ExploreResult<CleanOutcome> {
    let raw = loader::load_file(path, delimiter)?;
    Ok(clean::clean(&raw))
}
