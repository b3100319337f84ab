//! A single active directory watch.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::{MonitorError, Result};
use crate::event::{self, DetectionEvent};

/// How long `stop` waits for the delivery thread before detaching it.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Repeated creation reports for one path inside this window collapse
/// into a single detection. Platform backends are allowed to report the
/// same creation more than once.
const DEDUP_WINDOW: Duration = Duration::from_millis(500);

/// Poll interval for the shutdown flag in the delivery loop.
const PUMP_TICK: Duration = Duration::from_millis(250);

/// One filesystem watch plus the thread that pumps its events.
///
/// The session watches exactly one directory, non-recursively, and invokes
/// the callback for every regular file created directly inside it. The
/// callback runs on the delivery thread and must stay cheap; slow side
/// effects belong on their own queue.
pub struct WatchSession {
    watcher: Option<RecommendedWatcher>,
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    join: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl WatchSession {
    /// Start watching `path` and deliver creation events to `on_event`.
    pub fn spawn(
        path: &Path,
        on_event: impl Fn(DetectionEvent) + Send + 'static,
    ) -> Result<Self> {
        validate_dir(path)?;

        let (event_tx, event_rx) = unbounded::<notify::Result<notify::Event>>();
        let mut watcher = notify::recommended_watcher(move |res| {
            // Best-effort send; a closed receiver means we are shutting down.
            let _ = event_tx.send(res);
        })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<()>(1);

        let watched = path.to_path_buf();
        let join = thread::spawn(move || {
            pump_events(&event_rx, &stop_rx, &watched, &on_event);
            let _ = done_tx.try_send(());
        });

        debug!("watch session started for {}", path.display());

        Ok(Self {
            watcher: Some(watcher),
            stop_tx,
            done_rx,
            join: Some(join),
            path: path.to_path_buf(),
        })
    }

    /// Directory this session watches.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the platform watch handle without waiting for the delivery
    /// thread. After this no new filesystem events are produced, so a
    /// replacement watch can safely go up.
    fn release_watch(&mut self) {
        self.watcher.take();
    }

    /// Stop the session, waiting up to [`STOP_TIMEOUT`] for the delivery
    /// thread to finish. Returns whether the thread confirmed its exit;
    /// on timeout it is detached and drains on its own.
    pub fn stop(mut self) -> bool {
        self.release_watch();
        let _ = self.stop_tx.try_send(());

        match self.done_rx.recv_timeout(STOP_TIMEOUT) {
            Ok(()) => {
                if let Some(join) = self.join.take() {
                    let _ = join.join();
                }
                debug!("watch session for {} stopped", self.path.display());
                true
            }
            Err(_) => {
                warn!(
                    "delivery thread for {} did not stop within {STOP_TIMEOUT:?}; detaching",
                    self.path.display()
                );
                self.join.take();
                false
            }
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        // `stop` already cleared these; a bare drop still signals the
        // thread without blocking on it.
        self.watcher.take();
        let _ = self.stop_tx.try_send(());
    }
}

/// Check that `path` names a watchable directory.
pub(crate) fn validate_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.is_absolute() {
        return Err(MonitorError::InvalidPath(path.to_path_buf()));
    }

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => MonitorError::PermissionDenied(path.to_path_buf()),
        _ => MonitorError::InvalidPath(path.to_path_buf()),
    })?;

    if !metadata.is_dir() {
        return Err(MonitorError::InvalidPath(path.to_path_buf()));
    }

    // Readability probe; the watch backend may only fail much later.
    fs::read_dir(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => MonitorError::PermissionDenied(path.to_path_buf()),
        _ => MonitorError::Io(e),
    })?;

    Ok(())
}

fn pump_events(
    event_rx: &Receiver<notify::Result<notify::Event>>,
    stop_rx: &Receiver<()>,
    watched: &Path,
    on_event: &(impl Fn(DetectionEvent) + Send + 'static),
) {
    let mut last_seen: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        if stop_rx.try_recv().is_ok() {
            debug!("delivery shutdown requested");
            break;
        }

        match event_rx.recv_timeout(PUMP_TICK) {
            Ok(Ok(event)) => {
                if !event::is_creation(&event.kind) {
                    continue;
                }

                for path in event.paths {
                    if recently_seen(&mut last_seen, &path) {
                        debug!("duplicate creation report for {}", path.display());
                        continue;
                    }

                    if let Some(detection) = DetectionEvent::for_created_path(&path) {
                        on_event(detection);
                    }
                }
            }
            Ok(Err(e)) => {
                warn!("watch backend error on {}: {e}", watched.display());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("watch channel closed");
                break;
            }
        }
    }

    debug!("delivery thread for {} finished", watched.display());
}

fn recently_seen(seen: &mut HashMap<PathBuf, Instant>, path: &Path) -> bool {
    let now = Instant::now();
    seen.retain(|_, at| now.duration_since(*at) < DEDUP_WINDOW);

    if seen.contains_key(path) {
        return true;
    }
    seen.insert(path.to_path_buf(), now);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_path_is_invalid() {
        let err = validate_dir(Path::new("")).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPath(_)));
    }

    #[test]
    fn relative_path_is_invalid() {
        let err = validate_dir(Path::new("some/relative/dir")).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPath(_)));
    }

    #[test]
    fn missing_path_is_invalid() {
        let err = validate_dir(Path::new("/nonexistent/path/12345")).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPath(_)));
    }

    #[test]
    fn file_path_is_invalid() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir.txt");
        fs::write(&file, b"x").unwrap();

        let err = validate_dir(&file).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPath(_)));
    }

    #[test]
    fn existing_directory_is_valid() {
        let dir = TempDir::new().unwrap();
        assert!(validate_dir(dir.path()).is_ok());
    }

    #[test]
    fn duplicate_reports_inside_the_window_are_suppressed() {
        let mut seen = HashMap::new();
        let path = Path::new("/watch/drop.txt");

        assert!(!recently_seen(&mut seen, path));
        assert!(recently_seen(&mut seen, path));

        // A different path is never confused with the first.
        assert!(!recently_seen(&mut seen, Path::new("/watch/other.txt")));
    }
}
