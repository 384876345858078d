use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state afterwards.
    let year_span = dataset.year_span;
    let journals: Vec<String> = dataset.journals.iter().cloned().collect();

    // ---- Year range ----
    ui.strong("Publish year");
    match year_span {
        Some((lo, hi)) => {
            let (mut from, mut to) = state.filters.year_range.unwrap_or((lo, hi));
            let from_changed = ui
                .add(egui::Slider::new(&mut from, lo..=hi).text("from"))
                .changed();
            let to_changed = ui
                .add(egui::Slider::new(&mut to, lo..=hi).text("to"))
                .changed();
            if from_changed || to_changed {
                state.set_year_range(from, to);
            }
        }
        None => {
            ui.label("No dated papers.");
        }
    }

    let mut include_undated = state.filters.include_undated;
    if ui
        .checkbox(&mut include_undated, "Include papers without a date")
        .changed()
    {
        state.set_include_undated(include_undated);
    }
    ui.separator();

    // ---- Journal ----
    ui.strong("Journal");
    let current = state.filters.journal.clone();
    let mut selected = current.clone();
    egui::ComboBox::from_id_salt("journal")
        .selected_text(current.as_deref().unwrap_or("All journals"))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut selected, None, "All journals");
            for journal in &journals {
                ui.selectable_value(&mut selected, Some(journal.clone()), journal.as_str());
            }
        });
    if selected != current {
        state.set_journal(selected);
    }
    ui.separator();

    if ui.button("Reset filters").clicked() {
        state.reset_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export charts…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} papers loaded, {} visible ({})",
                ds.len(),
                state.visible_indices.len(),
                state.filters.describe()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") || msg.starts_with("Export failed") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CORD-19 metadata")
        .add_filter("Delimited text", &["csv", "tsv", "tab", "txt"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Export charts to folder")
        .pick_folder();

    if let Some(dir) = folder {
        state.export_charts(&dir);
    }
}
