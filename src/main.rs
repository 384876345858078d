mod app;
mod color;
mod config;
mod data;
mod error;
mod report;
mod state;
mod ui;
mod wordcloud;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use crate::app::ExplorerApp;
use crate::config::{Cli, Command, DashboardArgs, ReportArgs};
use crate::data::load_dataset;
use crate::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Report(args)) => run_report(args),
        Some(Command::Dashboard(args)) => run_dashboard(args),
        None => run_dashboard(DashboardArgs::default()),
    }
}

fn run_report(args: ReportArgs) -> Result<()> {
    let cleaned = load_dataset(&args.data, args.delimiter)?;
    let dataset = cleaned.dataset;
    let options = args.to_options(dataset.year_span);

    let outcome = report::write_charts(&dataset, &options)
        .with_context(|| format!("writing report to {}", options.out_dir.display()))?;

    println!(
        "{} papers ({}), {} charts written to {}",
        outcome.summary.total_papers,
        options.filters.describe(),
        outcome.written.len(),
        options.out_dir.display()
    );
    for key in &outcome.skipped {
        println!("  no data for {}", key.file_stem());
    }
    Ok(())
}

fn run_dashboard(args: DashboardArgs) -> Result<()> {
    let mut state = AppState {
        delimiter: args.delimiter,
        ..AppState::default()
    };
    // A file named on the command line must load, otherwise startup fails.
    if let Some(path) = &args.data {
        let cleaned = load_dataset(path, args.delimiter)?;
        state.set_dataset(cleaned, path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CORD-19 Metadata Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow!("dashboard failed: {e}"))
}
