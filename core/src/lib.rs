//! # Dropwatch Core
//!
//! This crate provides the monitoring engine for the dropwatch desktop
//! agent. It watches a single user-selected directory for newly created
//! files and turns each arrival into a notification and a sound cue.
//!
//! ## Features
//!
//! - **Watch Sessions**: One non-recursive filesystem watch per session
//! - **Lifecycle Control**: Serialized start / stop / change-path transitions
//! - **Daily Statistics**: Per-day counter with a short recent-file history
//! - **Pluggable Effects**: Notifier, sound player, and folder picker traits
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Dropwatch Core                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ConfigStore ──► MonitorController ──► WatchSession             │
//! │                        │                      │                 │
//! │                        ▼                      ▼                 │
//! │                  DetectionStats        DetectionEvent           │
//! │                        │                      │                 │
//! │                        └──► Notifier ◄────────┘                 │
//! │                             SoundPlayer                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod alert;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod session;
pub mod stats;

pub use alert::{
    DirectoryPicker, Notifier, NullDirectoryPicker, NullNotifier, NullSoundPlayer, SoundCue,
    SoundPlayer,
};
pub use config::{ConfigStore, JsonConfigStore, Settings};
pub use controller::{MonitorController, MonitorSnapshot, MonitorState, StartOutcome, StopOutcome};
pub use error::{MonitorError, Result};
pub use event::DetectionEvent;
pub use session::{STOP_TIMEOUT, WatchSession};
pub use stats::{DetectionStats, RECENT_FILES_CAP, StatsSnapshot};
