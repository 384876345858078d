use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ExploreError;

use super::model::{Column, Dataset, DatePrecision, PaperRecord, PublishDate, RawDataset};

// ---------------------------------------------------------------------------
// Cleaning pass: RawDataset → Dataset
// ---------------------------------------------------------------------------

/// Result of a cleaning pass, with counters for what was discarded.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub dataset: Dataset,
    /// Rows removed because their title was missing or blank.
    pub dropped_untitled: usize,
    /// Non-empty date cells that could not be parsed (kept as null).
    pub malformed_dates: usize,
    /// Cells the loader could not decode (kept as null).
    pub malformed_cells: usize,
}

/// Produce a cleaned dataset. The raw input is left untouched.
///
/// * untitled rows are dropped
/// * dates are parsed with [`parse_publish_date`]; failures become `None`
///   and are logged as [`ExploreError::MalformedField`] warnings
/// * everything else stays free text
pub fn clean(raw: &RawDataset) -> CleanOutcome {
    if raw.is_empty() {
        log::warn!("No data rows to clean");
    } else if !raw.columns.contains(&Column::Title) {
        log::warn!("No title column, every row will be dropped");
    }

    let mut records = Vec::with_capacity(raw.len());
    let mut dropped_untitled = 0;
    let mut malformed_dates = 0;

    for (i, row) in raw.records.iter().enumerate() {
        let Some(title) = row.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            dropped_untitled += 1;
            continue;
        };

        let publish_date = row.publish_time.as_deref().and_then(|text| {
            let parsed = parse_publish_date(text);
            if parsed.is_none() {
                malformed_dates += 1;
                log::warn!(
                    "{}",
                    ExploreError::MalformedField {
                        row: i + 1,
                        column: Column::PublishTime.name(),
                        value: text.to_string(),
                    }
                );
            }
            parsed
        });

        let abstract_text = row.abstract_text.clone();
        let abstract_word_count = abstract_text
            .as_deref()
            .map_or(0, |a| a.split_whitespace().count());

        records.push(PaperRecord {
            title: title.to_string(),
            abstract_text,
            publish_date,
            authors: row.authors.clone(),
            journal: row.journal.clone(),
            source: row.source.clone(),
            abstract_word_count,
        });
    }

    log::info!(
        "Cleaned {} rows: kept {}, dropped {} without title, {} unparsable dates",
        raw.len(),
        records.len(),
        dropped_untitled,
        malformed_dates
    );

    CleanOutcome {
        dataset: Dataset::from_records(records),
        dropped_untitled,
        malformed_dates,
        malformed_cells: raw.malformed_cells,
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

const DAY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y %b %d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const MONTH_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y %b %d"];

/// Parse the date spellings found in CORD-19 `publish_time`.
///
/// Year-only and year-month values are truncated to the first day of the
/// period and remember their precision. Returns `None` for anything else.
pub fn parse_publish_date(text: &str) -> Option<PublishDate> {
    let text = text.trim();
    let day = |date| PublishDate {
        date,
        precision: DatePrecision::Day,
    };

    if let Some(date) = DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(day(date));
    }

    let without_zone = text.strip_suffix('Z').unwrap_or(text);
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(without_zone, fmt).ok())
    {
        return Some(day(dt.date()));
    }

    // "2020-03" / "2020 Mar": pin to the first of the month.
    let month_start = if text.contains('-') {
        format!("{text}-01")
    } else {
        format!("{text} 01")
    };
    if let Some(date) = MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&month_start, fmt).ok())
    {
        return Some(PublishDate {
            date,
            precision: DatePrecision::Month,
        });
    }

    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = text.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(|date| PublishDate {
            date,
            precision: DatePrecision::Year,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;
    use crate::data::model::RawRecord;

    fn raw(title: Option<&str>, date: Option<&str>) -> RawRecord {
        RawRecord {
            title: title.map(str::to_string),
            publish_time: date.map(str::to_string),
            ..RawRecord::default()
        }
    }

    fn ymd(text: &str) -> Option<(i32, u32, u32, DatePrecision)> {
        parse_publish_date(text).map(|d| (d.date.year(), d.date.month(), d.date.day(), d.precision))
    }

    #[test]
    fn parses_full_dates() {
        use DatePrecision::*;
        assert_eq!(ymd("2020-03-01"), Some((2020, 3, 1, Day)));
        assert_eq!(ymd("2020/07/15"), Some((2020, 7, 15, Day)));
        assert_eq!(ymd("2020 Mar 5"), Some((2020, 3, 5, Day)));
        assert_eq!(ymd("2021-01-10T08:30:00Z"), Some((2021, 1, 10, Day)));
        assert_eq!(ymd("2021-01-10 08:30:00"), Some((2021, 1, 10, Day)));
        assert_eq!(ymd("  2019-12-31 "), Some((2019, 12, 31, Day)));
    }

    #[test]
    fn partial_dates_truncate_to_period_start() {
        use DatePrecision::*;
        assert_eq!(ymd("2020-06"), Some((2020, 6, 1, Month)));
        assert_eq!(ymd("2020 Jun"), Some((2020, 6, 1, Month)));
        assert_eq!(ymd("2020"), Some((2020, 1, 1, Year)));
    }

    #[test]
    fn rejects_garbage() {
        for text in ["invalid", "", "20", "2020-13-01", "2020-02-30", "Spring 2020", "20201"] {
            assert_eq!(parse_publish_date(text), None, "{text:?}");
        }
    }

    #[test]
    fn drops_untitled_and_nulls_bad_dates() {
        let input = RawDataset {
            records: vec![
                raw(Some("Kept"), Some("2020-03-01")),
                raw(None, Some("2020-03-01")),
                raw(Some("   "), None),
                raw(Some("  Bad date  "), Some("not a date")),
                raw(Some("No date"), None),
            ],
            ..RawDataset::default()
        };
        let out = clean(&input);
        assert_eq!(out.dropped_untitled, 2);
        assert_eq!(out.malformed_dates, 1);

        let titles: Vec<_> = out.dataset.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Kept", "Bad date", "No date"]);
        assert!(out.dataset.records.iter().all(|r| !r.title.trim().is_empty()));
        assert_eq!(out.dataset.records[0].year(), Some(2020));
        assert_eq!(out.dataset.records[1].publish_date, None);

        // Input untouched.
        assert_eq!(input.len(), 5);
        assert_eq!(input.records[3].title.as_deref(), Some("  Bad date  "));
    }

    #[test]
    fn counts_abstract_words() {
        let mut with_abstract = raw(Some("T"), None);
        with_abstract.abstract_text = Some("SARS-CoV-2  spike\nprotein binds ACE2".to_string());
        let out = clean(&RawDataset {
            records: vec![with_abstract, raw(Some("U"), None)],
            ..RawDataset::default()
        });
        assert_eq!(out.dataset.records[0].abstract_word_count, 5);
        assert_eq!(out.dataset.records[1].abstract_word_count, 0);
    }

    #[test]
    fn loader_then_cleaner_never_yields_empty_titles() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(
            b"title,publish_time,journal\n\
              First,2020-03-01,Nature\n\
              ,2020-07-15,Nature\n\
              \"  \",2021,Science\n\
              Last,invalid,\n",
        )
        .unwrap();
        let raw = crate::data::loader::load_file(file.path(), None).unwrap();
        let out = clean(&raw);
        assert_eq!(out.dataset.len(), 2);
        assert_eq!(out.malformed_cells, 0);
        assert!(out.dataset.records.iter().all(|r| !r.title.is_empty()));
    }
}
