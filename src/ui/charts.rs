use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{generate_palette, shades, view_hue};
use crate::data::aggregate::{AggregateResult, GroupKey, Summary};
use crate::data::model::PaperRecord;
use crate::state::AppState;
use crate::wordcloud::{layout_word_cloud, CloudSize};

const SAMPLE_ROWS: usize = 20;
const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Central panel: all views stacked vertically
// ---------------------------------------------------------------------------

/// Render every view for the current filters.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a metadata file to start  (File → Open…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("CORD-19 Metadata Analysis");
            ui.add_space(8.0);

            for (key, result) in &state.views {
                ui.heading(key.title());
                if result.is_empty() {
                    empty_state(ui);
                } else if *key == GroupKey::TitleWords {
                    word_cloud(ui, result);
                } else {
                    bar_chart(ui, *key, result);
                }
                ui.add_space(12.0);
            }

            ui.heading("Sample Data");
            sample_table(ui, &state.sample_rows(SAMPLE_ROWS));
            ui.add_space(12.0);

            ui.heading("Summary Statistics");
            summary(ui, &state.summary);
        });
}

fn empty_state(ui: &mut Ui) {
    ui.label(RichText::new("No data for the current filters").italics().color(Color32::GRAY));
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Years are drawn as vertical bars in chronological order, ranked views as
/// horizontal bars with the most frequent key on top.
fn bar_chart(ui: &mut Ui, key: GroupKey, result: &AggregateResult) {
    let vertical = key == GroupKey::Year;
    let entries = if vertical {
        result.sorted_by_key()
    } else {
        // Bars stack bottom-up; reverse so the most frequent key is on top.
        result.entries().iter().rev().cloned().collect()
    };
    let colors = shades(view_hue(key), entries.len());
    let n = entries.len();

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            // Ranked views are reversed, so their darkest shade is the last.
            let color = if vertical { colors[i] } else { colors[n - 1 - i] };
            Bar::new(i as f64, *count as f64)
                .name(label)
                .width(0.8)
                .fill(Color32::from(color))
        })
        .collect();

    let mut chart = BarChart::new(bars).name(key.title());
    if !vertical {
        chart = chart.horizontal();
    }

    let labels: Vec<String> = entries.into_iter().map(|(label, _)| label).collect();
    let category = move |mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    };

    let plot = Plot::new(key.file_stem())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);
    let plot = if vertical {
        plot.x_axis_label(key.axis_label())
            .y_axis_label("Number of Publications")
            .x_axis_formatter(category)
    } else {
        plot.x_axis_label("Number of Papers")
            .y_axis_label(key.axis_label())
            .y_axis_formatter(category)
    };
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

// ---------------------------------------------------------------------------
// Word cloud
// ---------------------------------------------------------------------------

fn word_cloud(ui: &mut Ui, result: &AggregateResult) {
    let width = ui.available_width().max(200.0);
    let size = CloudSize {
        width,
        height: CHART_HEIGHT,
        ..CloudSize::default()
    };
    let placed = layout_word_cloud(result.entries(), size);
    let palette = generate_palette(placed.len());

    let (response, painter) = ui.allocate_painter(egui::vec2(width, CHART_HEIGHT), Sense::hover());
    let origin = response.rect.min;
    painter.rect_filled(response.rect, 4.0, Color32::WHITE);
    for (word, color) in placed.iter().zip(palette) {
        painter.text(
            origin + egui::vec2(word.x, word.y),
            Align2::LEFT_TOP,
            &word.text,
            FontId::proportional(word.font_size),
            Color32::from(color),
        );
    }
}

// ---------------------------------------------------------------------------
// Sample table and summary
// ---------------------------------------------------------------------------

fn sample_table(ui: &mut Ui, rows: &[&PaperRecord]) {
    if rows.is_empty() {
        empty_state(ui);
        return;
    }
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    ui.push_id("sample_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::initial(320.0).clip(true))
            .column(Column::auto())
            .column(Column::initial(180.0).clip(true))
            .column(Column::auto())
            .column(Column::remainder().clip(true))
            .header(20.0, |mut header| {
                for name in ["Title", "Published", "Journal", "Source", "Authors"] {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for paper in rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(paper.title.as_str());
                        });
                        row.col(|ui| {
                            ui.label(paper.publish_date.map(|d| d.to_string()).unwrap_or_default());
                        });
                        row.col(|ui| {
                            ui.label(text(&paper.journal));
                        });
                        row.col(|ui| {
                            ui.label(text(&paper.source));
                        });
                        row.col(|ui| {
                            ui.label(text(&paper.authors));
                        });
                    });
                }
            });
    });
}

fn summary(ui: &mut Ui, summary: &Summary) {
    ui.label(format!("Total papers in selected range: {}", summary.total_papers));
    ui.label(format!(
        "With a publish date: {}, without: {}",
        summary.dated_papers, summary.undated_papers
    ));
    if let (Some(first), Some(last)) = (summary.first_year, summary.last_year) {
        ui.label(format!("Years covered: {first} to {last}"));
    }
    match summary.mean_abstract_word_count {
        Some(mean) => ui.label(format!("Average abstract word count: {mean:.1}")),
        None => ui.label("Average abstract word count: n/a"),
    };
}
