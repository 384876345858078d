use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ExploreError, ExploreResult};

use super::model::{Column, RawDataset, RawRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the metadata file into a [`RawDataset`].
///
/// `delimiter` overrides the default picked from the extension
/// (`.tsv` / `.tab` → tab, anything else → comma).
///
/// Only the recognised columns (see [`Column::aliases`]) are kept. Missing
/// columns are tolerated and read as null for every row; short rows are padded
/// with nulls. A cell that is not valid UTF-8 is logged as
/// [`ExploreError::MalformedField`] and read as null. A missing file, an empty
/// file or an undecodable header is [`ExploreError::DataUnavailable`].
pub fn load_file(path: &Path, delimiter: Option<u8>) -> ExploreResult<RawDataset> {
    if !path.is_file() {
        return Err(ExploreError::unavailable(path, "file not found"));
    }
    let delimiter = delimiter.unwrap_or_else(|| default_delimiter(path));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExploreError::unavailable(path, format!("opening file: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| ExploreError::unavailable(path, format!("reading header: {e}")))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ExploreError::unavailable(path, "no header row"));
    }

    let positions = column_positions(headers.iter());
    log::debug!(
        "{}: recognised columns {:?}",
        path.display(),
        positions.keys().map(|c| c.name()).collect::<Vec<_>>()
    );
    for column in Column::ALL {
        if !positions.contains_key(&column) {
            log::warn!(
                "{}: no '{}' column, treating it as always null",
                path.display(),
                column.name()
            );
        }
    }

    let mut records = Vec::new();
    let mut malformed_cells = 0;
    for (row_no, result) in reader.byte_records().enumerate() {
        // Row numbers in messages are 1-based data rows (header excluded).
        let record = result.map_err(|e| {
            ExploreError::unavailable(path, format!("data row {}: {e}", row_no + 1))
        })?;

        let mut raw = RawRecord::default();
        for (&column, &idx) in &positions {
            let Some(bytes) = record.get(idx) else {
                continue;
            };
            *raw.field_mut(column) = match std::str::from_utf8(bytes) {
                Ok(cell) => non_blank(cell),
                Err(_) => {
                    malformed_cells += 1;
                    log::warn!(
                        "{}",
                        ExploreError::MalformedField {
                            row: row_no + 1,
                            column: column.name(),
                            value: String::from_utf8_lossy(bytes).into_owned(),
                        }
                    );
                    None
                }
            };
        }
        records.push(raw);
    }

    log::info!("Read {} rows from {}", records.len(), path.display());
    Ok(RawDataset {
        records,
        columns: positions.into_keys().collect(),
        malformed_cells,
    })
}

fn default_delimiter(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "tsv" | "tab" => b'\t',
        _ => b',',
    }
}

/// Map each recognised column to its index in the header. When several
/// aliases are present the one listed first in [`Column::aliases`] wins.
fn column_positions<'a>(headers: impl Iterator<Item = &'a str>) -> BTreeMap<Column, usize> {
    let normalized: Vec<String> = headers.map(|h| h.trim().to_lowercase()).collect();
    Column::ALL
        .into_iter()
        .filter_map(|column| {
            column.aliases().iter().find_map(|alias| {
                normalized
                    .iter()
                    .position(|h| h == alias)
                    .map(|idx| (column, idx))
            })
        })
        .collect()
}

fn non_blank(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_recognised_columns_and_ignores_others() {
        let file = write_file(
            ".csv",
            b"cord_uid,title,abstract,publish_time,authors,journal,source_x,url\n\
              ug7v899j,Clinical features,Some abstract,2020-03-01,Doe J,Nature,PMC,http://x\n\
              02tnwd4m,,,invalid,,,,\n",
        );
        let raw = load_file(file.path(), None).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.columns.len(), 6);

        let first = &raw.records[0];
        assert_eq!(first.title.as_deref(), Some("Clinical features"));
        assert_eq!(first.abstract_text.as_deref(), Some("Some abstract"));
        assert_eq!(first.publish_time.as_deref(), Some("2020-03-01"));
        assert_eq!(first.authors.as_deref(), Some("Doe J"));
        assert_eq!(first.journal.as_deref(), Some("Nature"));
        assert_eq!(first.source.as_deref(), Some("PMC"));

        let second = &raw.records[1];
        assert_eq!(second.title, None);
        assert_eq!(second.publish_time.as_deref(), Some("invalid"));
    }

    #[test]
    fn missing_columns_and_short_rows_are_null() {
        let file = write_file(".csv", b"Title, Journal \nA paper,Science\nShort row\n");
        let raw = load_file(file.path(), None).unwrap();
        assert_eq!(
            raw.columns.iter().copied().collect::<Vec<_>>(),
            [Column::Title, Column::Journal]
        );
        assert_eq!(raw.records[0].journal.as_deref(), Some("Science"));
        assert_eq!(raw.records[0].publish_time, None);
        assert_eq!(raw.records[1].title.as_deref(), Some("Short row"));
        assert_eq!(raw.records[1].journal, None);
    }

    #[test]
    fn first_alias_wins() {
        let file = write_file(".csv", b"source,title,source_x\nWHO,T,PMC\n");
        let raw = load_file(file.path(), None).unwrap();
        assert_eq!(raw.records[0].source.as_deref(), Some("PMC"));
    }

    #[test]
    fn tsv_extension_uses_tabs() {
        let file = write_file(".tsv", b"title\tjournal\nA, B and C\tCell\n");
        let raw = load_file(file.path(), None).unwrap();
        assert_eq!(raw.records[0].title.as_deref(), Some("A, B and C"));
        assert_eq!(raw.records[0].journal.as_deref(), Some("Cell"));

        let semi = write_file(".txt", b"title;journal\nX;Y\n");
        let raw = load_file(semi.path(), Some(b';')).unwrap();
        assert_eq!(raw.records[0].journal.as_deref(), Some("Y"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("metadata.csv"), None).unwrap_err();
        assert!(matches!(err, ExploreError::DataUnavailable { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn empty_file_and_binary_header_are_unavailable() {
        let empty = write_file(".csv", b"");
        assert!(matches!(
            load_file(empty.path(), None),
            Err(ExploreError::DataUnavailable { .. })
        ));

        let binary = write_file(".csv", b"\xff\xfetitle\nA paper\n");
        assert!(matches!(
            load_file(binary.path(), None),
            Err(ExploreError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn undecodable_cell_is_null_and_the_rest_loads() {
        let file = write_file(
            ".csv",
            b"title,abstract,journal\n\
              Spike protein,bad \xff\xfe\x00 bytes,Nature\n\
              \xffgarbage,fine,Cell\n\
              Antibodies,ok,Science\n",
        );
        let raw = load_file(file.path(), None).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.malformed_cells, 2);

        assert_eq!(raw.records[0].title.as_deref(), Some("Spike protein"));
        assert_eq!(raw.records[0].abstract_text, None);
        assert_eq!(raw.records[0].journal.as_deref(), Some("Nature"));
        assert_eq!(raw.records[1].title, None);
        assert_eq!(raw.records[1].abstract_text.as_deref(), Some("fine"));
        assert_eq!(raw.records[2].journal.as_deref(), Some("Science"));
    }
}
