//! Monitor lifecycle controller.
//!
//! `MonitorController` owns the watched-path state and at most one
//! [`WatchSession`]. All transitions (`start`, `stop`, `change_path`) are
//! serialized through one internal lock; event delivery and side effects
//! run on their own threads and never touch that lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::alert::{Notifier, SoundCue, SoundPlayer};
use crate::config::{ConfigStore, Settings};
use crate::error::{MonitorError, Result};
use crate::session::{self, WatchSession};
use crate::stats::{DetectionStats, StatsSnapshot};

/// Capacity of the side-effect queue. A slow notifier fills the queue and
/// further effects are dropped; event delivery is never blocked.
const EFFECT_QUEUE_CAP: usize = 64;

/// How often the background ticker re-checks the calendar day.
const ROLLOVER_TICK: Duration = Duration::from_secs(60);

/// How long teardown waits for the effects thread.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Duration hint for regular notifications.
const NOTICE_DURATION: Duration = Duration::from_secs(4);

/// Duration hint for the pause notification.
const PAUSE_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Monitor lifecycle state visible to adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No active watch.
    Stopped,

    /// A watch session is delivering events.
    Running,
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session is now watching.
    Started,

    /// A session was already active; nothing changed.
    AlreadyRunning,
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The active session ended.
    Stopped,

    /// No session was active; nothing changed.
    NotRunning,
}

/// Read-only view of the controller.
#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    /// Current lifecycle state.
    pub state: MonitorState,

    /// Directory being watched, or the one that would be on start.
    pub watched_path: Option<PathBuf>,

    /// Detection counters.
    pub stats: StatsSnapshot,
}

/// Owns the watched-path state, the active session, and the stats.
pub struct MonitorController {
    inner: Mutex<ControllerInner>,
    stats: Arc<DetectionStats>,
    effects: EffectsRunner,
    ticker: Ticker,
    config: Arc<dyn ConfigStore>,
}

struct ControllerInner {
    watched_path: Option<PathBuf>,
    session: Option<WatchSession>,
}

impl MonitorController {
    /// Create a controller, loading the watched path from `config`.
    ///
    /// Construction starts the effects thread and the daily-rollover
    /// ticker; both are joined again when the controller is dropped.
    pub fn new(
        config: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
        sounds: Arc<dyn SoundPlayer>,
    ) -> Self {
        let watched_path = config.load().and_then(|settings| settings.watched_path);
        let stats = Arc::new(DetectionStats::default());
        let effects = EffectsRunner::spawn(notifier, sounds);
        let ticker = Ticker::spawn(Arc::clone(&stats), effects.sender());

        Self {
            inner: Mutex::new(ControllerInner {
                watched_path,
                session: None,
            }),
            stats,
            effects,
            ticker,
            config,
        }
    }

    /// Start monitoring the configured directory.
    ///
    /// Benign when already running. Fails without a state change when no
    /// directory is configured or the directory cannot be watched.
    pub fn start(&self) -> Result<StartOutcome> {
        let mut inner = self.inner.lock();

        if inner.session.is_some() {
            debug!("start requested while already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let Some(path) = inner.watched_path.clone() else {
            drop(inner);
            let e = MonitorError::InvalidPath(PathBuf::new());
            warn!("start requested with no folder selected");
            self.emit_error(&e);
            return Err(e);
        };

        match self.spawn_session(&path) {
            Ok(session) => {
                inner.session = Some(session);
                drop(inner);
                info!("monitoring started for {}", path.display());
                self.emit_started(&path);
                Ok(StartOutcome::Started)
            }
            Err(e) => {
                drop(inner);
                warn!("start failed: {e}");
                self.emit_error(&e);
                Err(e)
            }
        }
    }

    /// Stop monitoring. Benign when already stopped.
    ///
    /// The transition to `Stopped` is unconditional even when the session
    /// teardown times out internally.
    pub fn stop(&self) -> StopOutcome {
        let mut inner = self.inner.lock();

        let Some(session) = inner.session.take() else {
            debug!("stop requested while already stopped");
            return StopOutcome::NotRunning;
        };

        session.stop();
        drop(inner);

        info!("monitoring paused");
        self.emit_paused();
        StopOutcome::Stopped
    }

    /// Switch to a new directory: stop the current session, persist the
    /// new path, start watching it. Also starts monitoring when invoked
    /// while stopped.
    ///
    /// On failure the previous path is restored (and re-persisted), and a
    /// session that was interrupted resumes on the previous path.
    pub fn change_path(&self, new_path: impl Into<PathBuf>) -> Result<()> {
        let new_path = new_path.into();
        let mut inner = self.inner.lock();

        // Fail fast so a bad selection never interrupts a healthy session.
        if let Err(e) = session::validate_dir(&new_path) {
            drop(inner);
            warn!("rejected path change to {}: {e}", new_path.display());
            self.emit_error(&e);
            return Err(e);
        }

        let was_running = inner.session.is_some();
        if let Some(session) = inner.session.take() {
            session.stop();
        }

        let previous = inner.watched_path.replace(new_path.clone());
        self.persist(&inner.watched_path);

        match self.spawn_session(&new_path) {
            Ok(session) => {
                inner.session = Some(session);
                drop(inner);
                info!("watched path changed to {}", new_path.display());
                self.emit_started(&new_path);
                Ok(())
            }
            Err(e) => {
                // Restore the previous path so settings and state stay in
                // step, and resume it if a session was interrupted.
                inner.watched_path = previous;
                self.persist(&inner.watched_path);

                if was_running {
                    if let Some(prev) = inner.watched_path.clone() {
                        match self.spawn_session(&prev) {
                            Ok(session) => {
                                inner.session = Some(session);
                                info!("resumed watching {}", prev.display());
                            }
                            Err(resume_err) => {
                                warn!("could not resume {}: {resume_err}", prev.display());
                            }
                        }
                    }
                }

                drop(inner);
                warn!("path change failed: {e}");
                self.emit_error(&e);
                Err(e)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        if self.inner.lock().session.is_some() {
            MonitorState::Running
        } else {
            MonitorState::Stopped
        }
    }

    /// Read-only copy of state, path, and counters.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let inner = self.inner.lock();
        MonitorSnapshot {
            state: if inner.session.is_some() {
                MonitorState::Running
            } else {
                MonitorState::Stopped
            },
            watched_path: inner.watched_path.clone(),
            stats: self.stats.snapshot(),
        }
    }

    fn spawn_session(&self, path: &Path) -> Result<WatchSession> {
        let stats = Arc::clone(&self.stats);
        let effects = self.effects.sender();

        WatchSession::spawn(path, move |event| {
            let total = stats.record(&event.file_name, event.detected_at);
            debug!("detected {} (total today: {total})", event.path.display());
            effects.notice(
                "New file detected",
                format!("{}\nTotal today: {total}", event.file_name),
                NOTICE_DURATION,
            );
            effects.sound(SoundCue::Alert);
        })
    }

    fn persist(&self, watched_path: &Option<PathBuf>) {
        let settings = Settings {
            watched_path: watched_path.clone(),
        };
        if let Err(e) = self.config.save(&settings) {
            warn!("could not save settings: {e}");
        }
    }

    fn emit_started(&self, path: &Path) {
        let effects = self.effects.sender();
        effects.notice(
            "Monitoring started",
            format!("Watching {}", path.display()),
            NOTICE_DURATION,
        );
        effects.sound(SoundCue::Start);
    }

    fn emit_paused(&self) {
        let effects = self.effects.sender();
        effects.notice(
            "Monitoring paused",
            "New files are no longer announced.",
            PAUSE_NOTICE_DURATION,
        );
        effects.sound(SoundCue::Pause);
    }

    fn emit_error(&self, error: &MonitorError) {
        self.effects
            .sender()
            .notice("Monitoring error", error.to_string(), NOTICE_DURATION);
    }
}

impl Drop for MonitorController {
    fn drop(&mut self) {
        self.stop();
        self.ticker.shutdown();
        self.effects.shutdown();
    }
}

/// Side effects queued for the effects thread.
enum Effect {
    Notice {
        title: &'static str,
        body: String,
        duration: Duration,
    },
    Sound(SoundCue),
    Shutdown,
}

/// Handle for queueing effects. Enqueueing never blocks.
#[derive(Clone)]
struct EffectsSender {
    tx: Sender<Effect>,
}

impl EffectsSender {
    fn notice(&self, title: &'static str, body: impl Into<String>, duration: Duration) {
        self.push(Effect::Notice {
            title,
            body: body.into(),
            duration,
        });
    }

    fn sound(&self, cue: SoundCue) {
        self.push(Effect::Sound(cue));
    }

    fn push(&self, effect: Effect) {
        if self.tx.try_send(effect).is_err() {
            warn!("effect queue full or closed; dropping effect");
        }
    }
}

/// Thread that plays notifications and sounds off the delivery path.
struct EffectsRunner {
    tx: Sender<Effect>,
    done_rx: Receiver<()>,
    join: Option<JoinHandle<()>>,
}

impl EffectsRunner {
    fn spawn(notifier: Arc<dyn Notifier>, sounds: Arc<dyn SoundPlayer>) -> Self {
        let (tx, rx) = bounded::<Effect>(EFFECT_QUEUE_CAP);
        let (done_tx, done_rx) = bounded::<()>(1);

        let join = thread::spawn(move || {
            while let Ok(effect) = rx.recv() {
                match effect {
                    Effect::Notice {
                        title,
                        body,
                        duration,
                    } => notifier.show(title, &body, duration),
                    Effect::Sound(cue) => sounds.play(cue),
                    Effect::Shutdown => break,
                }
            }
            let _ = done_tx.try_send(());
        });

        Self {
            tx,
            done_rx,
            join: Some(join),
        }
    }

    fn sender(&self) -> EffectsSender {
        EffectsSender {
            tx: self.tx.clone(),
        }
    }

    fn shutdown(&mut self) {
        if self
            .tx
            .send_timeout(Effect::Shutdown, SHUTDOWN_GRACE)
            .is_err()
        {
            warn!("effect queue busy at shutdown; detaching effects thread");
            self.join.take();
            return;
        }

        if self.done_rx.recv_timeout(SHUTDOWN_GRACE).is_ok() {
            if let Some(join) = self.join.take() {
                let _ = join.join();
            }
        } else {
            warn!("effects thread still draining; detaching");
            self.join.take();
        }
    }
}

/// Thread that checks for calendar rollover once a minute.
struct Ticker {
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl Ticker {
    fn spawn(stats: Arc<DetectionStats>, effects: EffectsSender) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let join = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(ROLLOVER_TICK) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                if stats.roll_over_if_new_day(Local::now().date_naive()) {
                    info!("daily counter reset");
                    effects.notice(
                        "Daily counter reset",
                        "A new day started; the total is back to zero.",
                        NOTICE_DURATION,
                    );
                }
            }
        });

        Self {
            stop_tx,
            join: Some(join),
        }
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{NullNotifier, NullSoundPlayer};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<Settings>>,
    }

    impl ConfigStore for MemoryStore {
        fn load(&self) -> Option<Settings> {
            self.saved.lock().clone()
        }

        fn save(&self, settings: &Settings) -> Result<()> {
            *self.saved.lock() = Some(settings.clone());
            Ok(())
        }
    }

    fn controller_with_store(store: Arc<MemoryStore>) -> MonitorController {
        MonitorController::new(store, Arc::new(NullNotifier), Arc::new(NullSoundPlayer))
    }

    #[test]
    fn start_without_configured_path_fails() {
        let controller = controller_with_store(Arc::new(MemoryStore::default()));

        let err = controller.start().unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPath(_)));
        assert_eq!(controller.state(), MonitorState::Stopped);
    }

    #[test]
    fn stop_when_stopped_is_benign() {
        let controller = controller_with_store(Arc::new(MemoryStore::default()));

        assert_eq!(controller.stop(), StopOutcome::NotRunning);
        assert_eq!(controller.state(), MonitorState::Stopped);
    }

    #[test]
    fn snapshot_reflects_configured_path() {
        let store = Arc::new(MemoryStore::default());
        store
            .save(&Settings::default().with_watched_path("/data/inbox"))
            .unwrap();

        let controller = controller_with_store(store);
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.state, MonitorState::Stopped);
        assert_eq!(
            snapshot.watched_path.as_deref(),
            Some(Path::new("/data/inbox"))
        );
        assert_eq!(snapshot.stats.count_today, 0);
    }

    #[test]
    fn change_path_to_missing_dir_fails_without_persisting() {
        let store = Arc::new(MemoryStore::default());
        let controller = controller_with_store(Arc::clone(&store));

        let err = controller
            .change_path("/nonexistent/dropwatch-target")
            .unwrap_err();

        assert!(matches!(err, MonitorError::InvalidPath(_)));
        assert_eq!(controller.state(), MonitorState::Stopped);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn change_path_from_stopped_persists_and_starts() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::default());
        let controller = controller_with_store(Arc::clone(&store));

        controller.change_path(dir.path()).unwrap();

        assert_eq!(controller.state(), MonitorState::Running);
        let saved = store.load().unwrap();
        assert_eq!(saved.watched_path.as_deref(), Some(dir.path()));
    }
}
