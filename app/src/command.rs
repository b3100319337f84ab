//! Menu commands shared by the tray and console front ends.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dropwatch_core::{
    DirectoryPicker, MonitorController, MonitorSnapshot, MonitorState, Notifier,
};
use tracing::{info, warn};

const NOTICE: Duration = Duration::from_secs(4);

/// Commands the user can issue from any front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    /// Start monitoring the configured folder.
    Start,

    /// Pause monitoring.
    Stop,

    /// Watch a different folder; `None` asks the picker.
    ChangePath(Option<PathBuf>),

    /// Show today's count and the latest files.
    ShowStats,

    /// Open the watched folder in the file manager.
    OpenFolder,

    /// Stop monitoring and leave the front end.
    Exit,
}

/// Whether the front end should keep running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Routes menu commands to the controller and reports outcomes to the
/// user. Dispatch never fails; rejected commands are logged and shown.
pub struct CommandDispatcher {
    controller: Arc<MonitorController>,
    picker: Arc<dyn DirectoryPicker>,
    notifier: Arc<dyn Notifier>,
}

impl CommandDispatcher {
    pub fn new(
        controller: Arc<MonitorController>,
        picker: Arc<dyn DirectoryPicker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            controller,
            picker,
            notifier,
        }
    }

    pub fn controller(&self) -> &MonitorController {
        &self.controller
    }

    /// Execute one command.
    pub fn dispatch(&self, command: MenuCommand) -> Flow {
        match command {
            MenuCommand::Start => {
                if let Err(e) = self.controller.start() {
                    warn!("start rejected: {e}");
                }
                Flow::Continue
            }
            MenuCommand::Stop => {
                self.controller.stop();
                Flow::Continue
            }
            MenuCommand::ChangePath(path) => {
                self.change_path(path);
                Flow::Continue
            }
            MenuCommand::ShowStats => {
                let snapshot = self.controller.snapshot();
                self.notifier
                    .show("Dropwatch stats", &format_stats(&snapshot), NOTICE);
                Flow::Continue
            }
            MenuCommand::OpenFolder => {
                self.open_watched_folder();
                Flow::Continue
            }
            MenuCommand::Exit => {
                self.controller.stop();
                Flow::Exit
            }
        }
    }

    /// Ask the picker for a folder when none is configured yet.
    ///
    /// First-run helper shared by the front ends; an already configured
    /// folder is left alone.
    pub fn prompt_if_unconfigured(&self) {
        if self.controller.snapshot().watched_path.is_none() {
            self.change_path(None);
        }
    }

    fn change_path(&self, path: Option<PathBuf>) {
        let Some(path) = path.or_else(|| self.picker.choose()) else {
            info!("folder selection cancelled");
            self.notifier
                .show("No folder selected", "Monitoring is unchanged.", NOTICE);
            return;
        };

        let path = match std::path::absolute(&path) {
            Ok(path) => path,
            Err(e) => {
                warn!("could not resolve {}: {e}", path.display());
                return;
            }
        };

        if let Err(e) = self.controller.change_path(path) {
            warn!("path change rejected: {e}");
        }
    }

    fn open_watched_folder(&self) {
        let Some(path) = self.controller.snapshot().watched_path else {
            self.notifier
                .show("No folder selected", "Pick a folder first.", NOTICE);
            return;
        };

        // The configured folder can vanish while the agent is idle.
        if !path.is_dir() {
            warn!("watched folder {} is gone", path.display());
            self.notifier.show(
                "Folder not found",
                "The watched folder no longer exists. Choose another one.",
                NOTICE,
            );
            return;
        }

        if let Err(e) = open_folder(&path) {
            warn!("could not open {}: {e}", path.display());
        }
    }
}

/// First line of the stats summary, also used as the tray status label.
pub fn status_line(snapshot: &MonitorSnapshot) -> String {
    match (snapshot.state, &snapshot.watched_path) {
        (MonitorState::Running, Some(path)) => format!("Watching {}", path.display()),
        (MonitorState::Stopped, Some(path)) => format!("Paused ({})", path.display()),
        (_, None) => "No folder selected".to_string(),
    }
}

/// Multi-line summary used by the stats notification.
pub fn format_stats(snapshot: &MonitorSnapshot) -> String {
    let mut lines = vec![status_line(snapshot)];
    lines.push(format!("Files today: {}", snapshot.stats.count_today));
    if !snapshot.stats.recent_files.is_empty() {
        lines.push(format!("Latest: {}", snapshot.stats.recent_files.join(", ")));
    }
    lines.join("\n")
}

#[cfg(target_os = "linux")]
fn open_folder(path: &Path) -> io::Result<()> {
    std::process::Command::new("xdg-open")
        .arg(path)
        .spawn()?
        .wait()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn open_folder(path: &Path) -> io::Result<()> {
    std::process::Command::new("open")
        .arg(path)
        .spawn()?
        .wait()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn open_folder(path: &Path) -> io::Result<()> {
    std::process::Command::new("explorer")
        .arg(path)
        .spawn()?
        .wait()?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn open_folder(_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no file manager integration for this platform",
    ))
}
