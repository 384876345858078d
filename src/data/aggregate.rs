use std::collections::BTreeMap;

use serde::Serialize;

use super::model::PaperRecord;

// ---------------------------------------------------------------------------
// Grouping keys
// ---------------------------------------------------------------------------

/// What to group papers by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Publish year; undated papers are excluded.
    Year,
    /// Journal name; papers without a journal are excluded.
    Journal,
    /// Source collection (`source_x`); papers without one are excluded.
    Source,
    /// Individual words of the title, stop words removed.
    TitleWords,
}

impl GroupKey {
    pub const ALL: [GroupKey; 4] = [
        GroupKey::Year,
        GroupKey::Journal,
        GroupKey::Source,
        GroupKey::TitleWords,
    ];

    /// Chart title.
    pub fn title(self) -> &'static str {
        match self {
            GroupKey::Year => "Publications per Year",
            GroupKey::Journal => "Top Journals",
            GroupKey::Source => "Distribution by Source",
            GroupKey::TitleWords => "Most Frequent Title Words",
        }
    }

    /// Name of the category axis.
    pub fn axis_label(self) -> &'static str {
        match self {
            GroupKey::Year => "Year",
            GroupKey::Journal => "Journal",
            GroupKey::Source => "Source",
            GroupKey::TitleWords => "Word",
        }
    }

    /// Output file name without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            GroupKey::Year => "publications_per_year",
            GroupKey::Journal => "top_journals",
            GroupKey::Source => "source_distribution",
            GroupKey::TitleWords => "title_words",
        }
    }

    /// Keys a single paper contributes to this grouping (possibly none,
    /// possibly several for title words).
    fn keys_of(self, paper: &PaperRecord) -> Vec<String> {
        match self {
            GroupKey::Year => paper.year().map(|y| y.to_string()).into_iter().collect(),
            GroupKey::Journal => paper.journal.iter().cloned().collect(),
            GroupKey::Source => paper.source.iter().cloned().collect(),
            GroupKey::TitleWords => title_words(&paper.title).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateResult
// ---------------------------------------------------------------------------

/// `(key, count)` pairs sorted by count descending, then key ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult {
    entries: Vec<(String, usize)>,
}

impl AggregateResult {
    fn from_counts(counts: BTreeMap<String, usize>) -> Self {
        // BTreeMap iteration is key-ascending and the sort is stable, so ties
        // stay in key order.
        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep the `n` most frequent keys.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Entries in key order. Numeric keys (years) compare as numbers, so
    /// the order is chronological.
    pub fn sorted_by_key(&self) -> Vec<(String, usize)> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| match (a.0.parse::<i64>(), b.0.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.0.cmp(&b.0),
        });
        entries
    }
}

/// Count papers (or title words) per key.
pub fn aggregate<'a>(
    records: impl IntoIterator<Item = &'a PaperRecord>,
    key: GroupKey,
) -> AggregateResult {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for paper in records {
        for k in key.keys_of(paper) {
            *counts.entry(k).or_default() += 1;
        }
    }
    AggregateResult::from_counts(counts)
}

// ---------------------------------------------------------------------------
// Views: one aggregate per chart
// ---------------------------------------------------------------------------

/// How many keys each ranked view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewLimits {
    pub top_journals: usize,
    pub top_sources: usize,
    pub top_words: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            top_journals: 10,
            top_sources: 20,
            top_words: 50,
        }
    }
}

/// Compute every chart's aggregate for the given papers, in [`GroupKey::ALL`]
/// order. Years are never truncated.
pub fn compute_views(
    records: &[&PaperRecord],
    limits: &ViewLimits,
) -> Vec<(GroupKey, AggregateResult)> {
    GroupKey::ALL
        .into_iter()
        .map(|key| {
            let result = aggregate(records.iter().copied(), key);
            let result = match key {
                GroupKey::Year => result,
                GroupKey::Journal => result.top(limits.top_journals),
                GroupKey::Source => result.top(limits.top_sources),
                GroupKey::TitleWords => result.top(limits.top_words),
            };
            (key, result)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Headline numbers for a set of papers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_papers: usize,
    pub dated_papers: usize,
    pub undated_papers: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Mean abstract length in words, counting missing abstracts as 0.
    pub mean_abstract_word_count: Option<f64>,
}

pub fn summarize<'a>(records: impl IntoIterator<Item = &'a PaperRecord>) -> Summary {
    let mut summary = Summary::default();
    let mut words = 0usize;
    for paper in records {
        summary.total_papers += 1;
        words += paper.abstract_word_count;
        match paper.year() {
            Some(y) => {
                summary.dated_papers += 1;
                summary.first_year = Some(summary.first_year.map_or(y, |f| f.min(y)));
                summary.last_year = Some(summary.last_year.map_or(y, |l| l.max(y)));
            }
            None => summary.undated_papers += 1,
        }
    }
    if summary.total_papers > 0 {
        summary.mean_abstract_word_count = Some(words as f64 / summary.total_papers as f64);
    }
    summary
}

// ---------------------------------------------------------------------------
// Title tokenisation
// ---------------------------------------------------------------------------

/// Common English words that carry no topic information.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "among", "and", "any", "are",
    "based", "been", "before", "being", "below", "between", "both", "but", "can", "could", "did",
    "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "her", "here", "hers", "him", "his", "how", "into", "its", "itself", "just",
    "may", "more", "most", "new", "nor", "not", "now", "off", "once", "only", "other", "our",
    "out", "over", "own", "same", "she", "should", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "too",
    "under", "until", "using", "very", "via", "was", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "without", "would", "you", "your",
];

/// Lower-cased title words worth counting: alphanumeric runs of at least
/// three characters that are neither numbers nor stop words.
pub fn title_words(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !w.chars().all(|c| c.is_numeric()))
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::clean::parse_publish_date;
    use crate::data::model::{DatePrecision, PublishDate};

    fn paper(title: &str, date: &str, journal: Option<&str>) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            abstract_text: None,
            publish_date: parse_publish_date(date),
            authors: None,
            journal: journal.map(str::to_string),
            source: None,
            abstract_word_count: 0,
        }
    }

    fn pairs(result: &AggregateResult) -> Vec<(&str, usize)> {
        result.entries().iter().map(|(k, c)| (k.as_str(), *c)).collect()
    }

    #[test]
    fn groups_by_year_excluding_undated() {
        let records = [
            paper("a", "2020-03-01", None),
            paper("b", "2020-07-15", None),
            paper("c", "2021-01-10", None),
            paper("d", "invalid", None),
        ];
        let result = aggregate(&records, GroupKey::Year);
        assert_eq!(pairs(&result), [("2020", 2), ("2021", 1)]);
    }

    #[test]
    fn groups_by_journal() {
        let records = [
            paper("a", "2020", Some("Nature")),
            paper("b", "2020", Some("Science")),
            paper("c", "2020", Some("Nature")),
            paper("d", "2020", None),
        ];
        let result = aggregate(&records, GroupKey::Journal);
        assert_eq!(pairs(&result), [("Nature", 2), ("Science", 1)]);
    }

    #[test]
    fn ties_break_by_key_and_output_is_stable() {
        let records = [
            paper("x", "2022", Some("Cell")),
            paper("x", "2019", Some("BMJ")),
            paper("x", "2019", Some("Lancet")),
            paper("x", "2022", Some("Lancet")),
            paper("x", "2020", Some("Cell")),
        ];
        let first = aggregate(&records, GroupKey::Journal);
        assert_eq!(pairs(&first), [("Cell", 2), ("Lancet", 2), ("BMJ", 1)]);
        assert_eq!(first, aggregate(&records, GroupKey::Journal));

        for key in GroupKey::ALL {
            let result = aggregate(&records, key);
            assert!(result.entries().windows(2).all(|w| {
                w[0].1 > w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0)
            }));
        }
    }

    #[test]
    fn empty_input_gives_empty_result() {
        for key in GroupKey::ALL {
            let result = aggregate(std::iter::empty::<&PaperRecord>(), key);
            assert!(result.is_empty());
            assert!(result.clone().top(3).is_empty());
        }
        assert_eq!(summarize(std::iter::empty::<&PaperRecord>()), Summary::default());
    }

    #[test]
    fn title_words_skip_noise() {
        let words: Vec<_> =
            title_words("The SARS-CoV-2 spike: a review of 2020 findings, and the Spike").collect();
        assert_eq!(words, ["sars", "cov", "spike", "review", "findings", "spike"]);

        let records = [
            paper("Spike protein structure", "2020", None),
            paper("Protein folding of the spike", "2020", None),
        ];
        let result = aggregate(&records, GroupKey::TitleWords);
        assert_eq!(
            pairs(&result),
            [("protein", 2), ("spike", 2), ("folding", 1), ("structure", 1)]
        );
    }

    #[test]
    fn top_and_key_order() {
        let records = [
            paper("a", "2021", None),
            paper("b", "2019", None),
            paper("c", "2021", None),
            paper("d", "2020", None),
        ];
        let result = aggregate(&records, GroupKey::Year);
        assert_eq!(
            result.sorted_by_key(),
            [("2019".to_string(), 1), ("2020".to_string(), 1), ("2021".to_string(), 2)]
        );
        assert_eq!(pairs(&result.top(2)), [("2021", 2), ("2019", 1)]);
    }

    #[test]
    fn key_order_is_numeric_for_years() {
        let ancient = PaperRecord {
            publish_date: Some(PublishDate {
                date: NaiveDate::from_ymd_opt(999, 1, 1).unwrap(),
                precision: DatePrecision::Day,
            }),
            ..paper("old", "", None)
        };
        let records = [paper("a", "2020", None), ancient, paper("b", "2003", None)];
        let result = aggregate(&records, GroupKey::Year);
        let years: Vec<String> = result.sorted_by_key().into_iter().map(|(k, _)| k).collect();
        assert_eq!(years, ["999", "2003", "2020"]);

        let journals = aggregate(
            &[paper("a", "2020", Some("Nature")), paper("b", "2020", Some("BMJ"))],
            GroupKey::Journal,
        );
        assert_eq!(journals.sorted_by_key()[0].0, "BMJ");
    }

    #[test]
    fn views_apply_limits_but_keep_all_years() {
        let records: Vec<PaperRecord> = (0..30)
            .map(|i| {
                let journal = format!("Journal {i:02}");
                paper("Viral genome", &format!("{}", 1990 + i), Some(&journal))
            })
            .collect();
        let refs: Vec<&PaperRecord> = records.iter().collect();
        let limits = ViewLimits {
            top_journals: 5,
            ..ViewLimits::default()
        };
        let views = compute_views(&refs, &limits);
        let keys: Vec<_> = views.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, GroupKey::ALL);
        assert_eq!(views[0].1.entries().len(), 30);
        assert_eq!(views[1].1.entries().len(), 5);
        assert!(views[2].1.is_empty());
        assert_eq!(views[3].1.entries()[0], ("genome".to_string(), 30));
    }

    #[test]
    fn summary_statistics() {
        let mut a = paper("a", "2019-05-01", None);
        a.abstract_word_count = 120;
        let mut b = paper("b", "2021", None);
        b.abstract_word_count = 60;
        let c = paper("c", "unknown", None);
        let summary = summarize([&a, &b, &c]);
        assert_eq!(summary.total_papers, 3);
        assert_eq!(summary.dated_papers, 2);
        assert_eq!(summary.undated_papers, 1);
        assert_eq!(summary.first_year, Some(2019));
        assert_eq!(summary.last_year, Some(2021));
        assert_eq!(summary.mean_abstract_word_count, Some(60.0));
        assert_eq!(
            a.publish_date.map(|d| d.date),
            NaiveDate::from_ymd_opt(2019, 5, 1)
        );
    }
}
