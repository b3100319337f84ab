//! Desktop agent that watches one folder and announces new files.
//!
//! The binary wires the monitoring engine to the desktop: notifications,
//! sound cues, a folder picker, and either a system tray menu or a small
//! console loop depending on the enabled features.

mod command;
#[cfg(not(feature = "tray"))]
mod console;
mod notifier;
mod picker;
mod sound;
#[cfg(feature = "tray")]
mod tray;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dropwatch_core::{JsonConfigStore, MonitorController, Notifier};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use crate::command::CommandDispatcher;

/// Watch a folder and announce newly created files.
#[derive(Debug, Parser)]
#[command(name = "dropwatch", version, about)]
struct Args {
    /// Directory to watch, replacing the saved selection.
    #[arg(long, value_name = "DIR")]
    path: Option<PathBuf>,

    /// Settings file location (defaults to the user config directory).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log notifications instead of showing desktop toasts.
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dropwatch=info,dropwatch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let store = match args.config {
        Some(path) => JsonConfigStore::new(path),
        None => JsonConfigStore::default_location(),
    };

    let notifier: Arc<dyn Notifier> = if args.quiet {
        Arc::new(notifier::LogNotifier)
    } else {
        Arc::new(notifier::DesktopNotifier)
    };

    let controller = Arc::new(MonitorController::new(
        Arc::new(store),
        Arc::clone(&notifier),
        sound::default_player(),
    ));

    let dispatcher = CommandDispatcher::new(
        Arc::clone(&controller),
        picker::default_picker(),
        Arc::clone(&notifier),
    );

    if let Some(path) = args.path {
        let path = std::path::absolute(&path)?;
        if let Err(e) = controller.change_path(path) {
            warn!("could not watch the requested directory: {e}");
        }
    } else if controller.snapshot().watched_path.is_some() {
        if let Err(e) = controller.start() {
            warn!("could not resume monitoring: {e}");
        }
    } else {
        info!("no folder configured yet");
        notifier.show(
            "Welcome to dropwatch",
            "Select a folder to begin monitoring.",
            Duration::from_secs(5),
        );
        #[cfg(not(feature = "tray"))]
        dispatcher.prompt_if_unconfigured();
    }

    #[cfg(feature = "tray")]
    return tray::run(dispatcher);

    #[cfg(not(feature = "tray"))]
    {
        console::run(&dispatcher)?;
        Ok(())
    }
}
