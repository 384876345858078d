use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use eframe::egui::FontDefinitions;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use serde::Serialize;

use crate::color::{generate_palette, shades, view_hue};
use crate::data::aggregate::{
    compute_views, summarize, AggregateResult, GroupKey, Summary, ViewLimits,
};
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::model::{Dataset, PaperRecord};
use crate::error::ExploreError;
use crate::wordcloud::{layout_word_cloud, CloudSize};

// ---------------------------------------------------------------------------
// Static report: one PNG per view plus summary.json
// ---------------------------------------------------------------------------

pub const SUMMARY_FILE: &str = "summary.json";

/// egui's bundled proportional face, used for every chart label.
const CHART_FONT: &str = "Ubuntu-Light";

/// Where and how the report is written.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub out_dir: PathBuf,
    pub filters: FilterState,
    pub limits: ViewLimits,
    /// Image size in pixels.
    pub image_size: (u32, u32),
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("charts"),
            filters: FilterState::default(),
            limits: ViewLimits::default(),
            image_size: (1000, 600),
        }
    }
}

/// What a report run produced.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Chart images written, in view order.
    pub written: Vec<PathBuf>,
    /// Views left out because nothing passed the filters.
    pub skipped: Vec<GroupKey>,
    pub summary: Summary,
    pub summary_path: PathBuf,
}

#[derive(Serialize)]
struct SummaryFile<'a> {
    filters: &'a FilterState,
    summary: &'a Summary,
    views: BTreeMap<&'static str, &'a AggregateResult>,
}

/// Filter the dataset, aggregate every view and write the charts.
///
/// An empty view is an [`ExploreError::EmptyInput`]: logged, listed in
/// [`ReportOutcome::skipped`], and the remaining views are still written.
pub fn write_charts(dataset: &Dataset, options: &ReportOptions) -> Result<ReportOutcome> {
    fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("creating output directory {}", options.out_dir.display()))?;

    let indices = filtered_indices(dataset, &options.filters);
    let records: Vec<&PaperRecord> = dataset.select(&indices).collect();
    log::info!(
        "Rendering report for {} of {} papers ({})",
        records.len(),
        dataset.len(),
        options.filters.describe()
    );

    let summary = summarize(records.iter().copied());
    let views = compute_views(&records, &options.limits);

    let summary_path = options.out_dir.join(SUMMARY_FILE);
    write_summary(&summary_path, &options.filters, &summary, &views)?;

    let caption_suffix = options.filters.describe();
    let mut written = Vec::new();
    let mut skipped = Vec::new();
    for (key, result) in &views {
        let path = options.out_dir.join(format!("{}.png", key.file_stem()));
        match render_view(*key, result, &path, &caption_suffix, options.image_size) {
            Ok(()) => {
                log::info!("Wrote {}", path.display());
                written.push(path);
            }
            Err(e) => match e.downcast_ref::<ExploreError>() {
                Some(err) if err.is_recoverable() => {
                    log::warn!("Skipping {}: {err}", key.file_stem());
                    skipped.push(*key);
                }
                _ => return Err(e),
            },
        }
    }

    Ok(ReportOutcome {
        written,
        skipped,
        summary,
        summary_path,
    })
}

fn write_summary(
    path: &Path,
    filters: &FilterState,
    summary: &Summary,
    views: &[(GroupKey, AggregateResult)],
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let contents = SummaryFile {
        filters,
        summary,
        views: views.iter().map(|(k, r)| (k.file_stem(), r)).collect(),
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &contents)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Render one aggregate to a PNG file. Fails with
/// [`ExploreError::EmptyInput`] when there is nothing to draw.
pub fn render_view(
    key: GroupKey,
    result: &AggregateResult,
    path: &Path,
    caption_suffix: &str,
    size: (u32, u32),
) -> Result<()> {
    if result.is_empty() {
        return Err(ExploreError::empty(key.file_stem()).into());
    }
    register_chart_font()?;
    let caption = format!("{} ({caption_suffix})", key.title());
    match key {
        GroupKey::Year => vertical_bars(key, &result.sorted_by_key(), path, &caption, size),
        GroupKey::Journal | GroupKey::Source => {
            horizontal_bars(key, result.entries(), path, &caption, size)
        }
        GroupKey::TitleWords => word_cloud(result.entries(), path, &caption, size),
    }
}

// -- Renderers --

/// Make egui's bundled font the "sans-serif" family of plotters. Done once
/// per process; the font bytes live for the rest of it.
fn register_chart_font() -> Result<()> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            let fonts = FontDefinitions::default();
            let data = fonts
                .font_data
                .get(CHART_FONT)
                .ok_or_else(|| format!("font {CHART_FONT} is not bundled"))?;
            let bytes: &'static [u8] = Box::leak(data.font.to_vec().into_boxed_slice());
            register_font("sans-serif", FontStyle::Normal, bytes)
                .map_err(|_| format!("loading font {CHART_FONT}: invalid font data"))
        })
        .clone()
        .map_err(|e| anyhow!(e))
}

/// Label of the bar nearest to a tick, or nothing for ticks between bars.
fn label_at(entries: &[(String, usize)], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 0.05 || rounded < 0.0 {
        return String::new();
    }
    entries
        .get(rounded as usize)
        .map(|(k, _)| shorten(k, 40))
        .unwrap_or_default()
}

fn shorten(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_chars - 1).collect();
        format!("{head}…")
    }
}

fn vertical_bars(
    key: GroupKey,
    entries: &[(String, usize)],
    path: &Path,
    caption: &str,
    size: (u32, u32),
) -> Result<()> {
    let n = entries.len();
    let max = entries.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;
    let colors = shades(view_hue(key), n);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..(max * 1.1))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| label_at(entries, *v))
        .x_desc(key.axis_label())
        .y_desc("Number of Publications")
        .draw()?;

    chart.draw_series(entries.iter().zip(colors).enumerate().map(|(i, ((_, count), color))| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, *count as f64)],
            RGBColor::from(color).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Most frequent entry on top.
fn horizontal_bars(
    key: GroupKey,
    entries: &[(String, usize)],
    path: &Path,
    caption: &str,
    size: (u32, u32),
) -> Result<()> {
    let n = entries.len();
    let max = entries.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;
    let colors = shades(view_hue(key), n);
    // Row i is drawn at y = n - 1 - i.
    let flipped: Vec<(String, usize)> = entries.iter().rev().cloned().collect();

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d(0f64..(max * 1.1), -0.5f64..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| label_at(&flipped, *v))
        .x_desc("Number of Papers")
        .y_desc(key.axis_label())
        .draw()?;

    chart.draw_series(entries.iter().zip(colors).enumerate().map(|(i, ((_, count), color))| {
        let y = (n - 1 - i) as f64;
        Rectangle::new(
            [(0.0, y - 0.4), (*count as f64, y + 0.4)],
            RGBColor::from(color).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn word_cloud(
    entries: &[(String, usize)],
    path: &Path,
    caption: &str,
    size: (u32, u32),
) -> Result<()> {
    const PADDING: i32 = 10;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let canvas = root.titled(caption, ("sans-serif", 26))?;
    let (width, height) = canvas.dim_in_pixel();

    let placed = layout_word_cloud(
        entries,
        CloudSize {
            width: width as f32 - 2.0 * PADDING as f32,
            height: height as f32 - 2.0 * PADDING as f32,
            ..CloudSize::default()
        },
    );
    let palette = generate_palette(placed.len());
    for (word, color) in placed.iter().zip(palette) {
        let style = ("sans-serif", word.font_size as f64)
            .into_font()
            .color(&RGBColor::from(color));
        canvas.draw(&Text::new(
            word.text.clone(),
            (word.x as i32 + PADDING, word.y as i32 + PADDING),
            style,
        ))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::aggregate;
    use crate::data::clean::parse_publish_date;

    fn paper(title: &str, date: &str, journal: &str) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            abstract_text: Some("one two three".to_string()),
            publish_date: parse_publish_date(date),
            authors: None,
            journal: Some(journal.to_string()),
            source: None,
            abstract_word_count: 3,
        }
    }

    fn sourced(mut paper: PaperRecord, source: &str) -> PaperRecord {
        paper.source = Some(source.to_string());
        paper
    }

    fn is_png(path: &Path) -> bool {
        fs::read(path).is_ok_and(|bytes| bytes.starts_with(b"\x89PNG\r\n\x1a\n"))
    }

    #[test]
    fn empty_view_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        let err = render_view(GroupKey::Journal, &AggregateResult::default(), &path, "", (400, 300))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExploreError>(),
            Some(ExploreError::EmptyInput { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn filtered_out_report_skips_every_view_and_writes_summary() {
        let dataset = Dataset::from_records(vec![paper("Spike", "2020-03-01", "Nature")]);
        let dir = tempfile::tempdir().unwrap();
        let options = ReportOptions {
            out_dir: dir.path().join("charts"),
            filters: FilterState {
                journal: Some("Science".to_string()),
                ..FilterState::default()
            },
            ..ReportOptions::default()
        };
        let outcome = write_charts(&dataset, &options).unwrap();
        assert!(outcome.written.is_empty());
        assert_eq!(outcome.skipped, GroupKey::ALL);
        assert_eq!(outcome.summary.total_papers, 0);

        let json: serde_json::Value =
            serde_json::from_reader(File::open(&outcome.summary_path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_papers"], 0);
        assert_eq!(json["filters"]["journal"], "Science");
        assert_eq!(json["views"]["top_journals"], serde_json::json!([]));
    }

    #[test]
    fn summary_file_holds_aggregates() {
        let dataset = Dataset::from_records(vec![
            paper("Spike protein", "2020-03-01", "Nature"),
            paper("Spike antibodies", "2020-07-15", "Nature"),
            paper("Protein folding", "2021-01-10", "Science"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let filters = FilterState::for_dataset(&dataset);
        let records: Vec<&PaperRecord> = dataset.records.iter().collect();
        let views = compute_views(&records, &ViewLimits::default());
        let summary = summarize(records.iter().copied());
        let path = dir.path().join(SUMMARY_FILE);
        write_summary(&path, &filters, &summary, &views).unwrap();

        let json: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(
            json["views"]["publications_per_year"],
            serde_json::json!([["2020", 2], ["2021", 1]])
        );
        assert_eq!(
            json["views"]["top_journals"],
            serde_json::json!([["Nature", 2], ["Science", 1]])
        );
        assert_eq!(json["summary"]["mean_abstract_word_count"], 3.0);
        assert_eq!(json["filters"]["year_range"], serde_json::json!([2020, 2021]));
    }

    #[test]
    fn renders_every_view_without_changing_aggregates() {
        let long_journal = "Journal of Medical Virology and Emerging Respiratory Disease";
        let dataset = Dataset::from_records(vec![
            sourced(paper("Spike protein structure", "2020-03-01", "Nature"), "PMC"),
            sourced(paper("Antibody response to spike", "2020 Jul", "Nature"), "Medline"),
            sourced(paper("Transmission in households", "2021", long_journal), "PMC"),
            sourced(paper("Müller cells and coronavirus", "unknown", "Cell"), "WHO"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let options = ReportOptions {
            out_dir: dir.path().join("charts"),
            image_size: (640, 400),
            ..ReportOptions::default()
        };
        let records: Vec<&PaperRecord> = dataset.records.iter().collect();
        let before = compute_views(&records, &options.limits);

        let outcome = write_charts(&dataset, &options).unwrap();
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.written.len(), 4);
        for (path, key) in outcome.written.iter().zip(GroupKey::ALL) {
            assert_eq!(path, &options.out_dir.join(format!("{}.png", key.file_stem())));
            assert!(is_png(path), "{}", path.display());
        }

        let json: serde_json::Value =
            serde_json::from_reader(File::open(&outcome.summary_path).unwrap()).unwrap();
        for (key, result) in &before {
            assert_eq!(json["views"][key.file_stem()], serde_json::to_value(result).unwrap());
        }
        assert_eq!(
            json["views"]["publications_per_year"],
            serde_json::json!([["2020", 2], ["2021", 1]])
        );
        assert_eq!(before, compute_views(&records, &options.limits));
        assert_eq!(outcome.summary.undated_papers, 1);
    }

    #[test]
    fn single_entry_views_render() {
        let dir = tempfile::tempdir().unwrap();
        let result = aggregate(&[paper("Spike", "2020-03-01", "Nature")], GroupKey::Journal);
        for key in [GroupKey::Year, GroupKey::Journal, GroupKey::TitleWords] {
            let path = dir.path().join(format!("{}.png", key.file_stem()));
            render_view(key, &result, &path, "all papers", (300, 200)).unwrap();
            assert!(is_png(&path));
        }
    }

    #[test]
    fn tick_labels_only_on_bars() {
        let entries = vec![("2019".to_string(), 1), ("2020".to_string(), 3)];
        assert_eq!(label_at(&entries, 0.0), "2019");
        assert_eq!(label_at(&entries, 1.01), "2020");
        assert_eq!(label_at(&entries, 0.5), "");
        assert_eq!(label_at(&entries, -0.5), "");
        assert_eq!(label_at(&entries, 2.0), "");
        assert_eq!(shorten("abcdef", 4), "abc…");
    }
}
