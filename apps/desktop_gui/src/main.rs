use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use clap::Parser;
use client_core::load_settings;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::MacroStudioApp;

#[derive(Debug, Parser)]
#[command(name = "macro-studio-gui", about = "Desktop front end for the macro studio")]
struct Args {
    /// Settings file; defaults to ./macro_studio.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    download_dir: Option<PathBuf>,
    /// Only list macros shared publicly.
    #[arg(long)]
    public_only: bool,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = match load_settings(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!("failed to load settings: {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = settings.apply_overrides(
        args.server_url,
        args.download_dir,
        args.public_only,
    ) {
        tracing::error!("invalid command line settings: {err}");
        std::process::exit(2);
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let _worker = runtime::launch(cmd_rx, ui_tx, settings.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Macro Studio")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Macro Studio",
        options,
        Box::new(move |_cc| Ok(Box::new(MacroStudioApp::new(cmd_tx, ui_rx, &settings)))),
    )
}
