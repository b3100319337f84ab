//! Collaborator interfaces for user-visible side effects.
//!
//! The engine treats all of these as fire-and-forget: implementations
//! handle their own failures and never feed errors back into event
//! delivery or lifecycle control.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

/// Sound cues the agent can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Monitoring started.
    Start,

    /// New file detected.
    Alert,

    /// Monitoring paused.
    Pause,
}

/// Shows user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Show a notification. The duration is a hint; implementations may
    /// clamp or ignore it.
    fn show(&self, title: &str, body: &str, duration_hint: Duration);
}

/// Plays short audio cues, best-effort.
pub trait SoundPlayer: Send + Sync {
    /// Play a cue.
    fn play(&self, cue: SoundCue);
}

/// Lets the user pick a directory. Blocking; call from a control thread,
/// never from event delivery.
pub trait DirectoryPicker: Send + Sync {
    /// Ask the user for a directory. `None` when cancelled or when no
    /// dialog is available.
    fn choose(&self) -> Option<PathBuf>;
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn show(&self, title: &str, _body: &str, _duration_hint: Duration) {
        debug!("notification suppressed: {title}");
    }
}

/// Sound player that stays silent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSoundPlayer;

impl SoundPlayer for NullSoundPlayer {
    fn play(&self, _cue: SoundCue) {}
}

/// Picker that never offers a choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDirectoryPicker;

impl DirectoryPicker for NullDirectoryPicker {
    fn choose(&self) -> Option<PathBuf> {
        None
    }
}
