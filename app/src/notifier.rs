//! Notification back ends.

use std::time::Duration;

use dropwatch_core::Notifier;
use notify_rust::{Notification, Timeout};
use tracing::{info, warn};

/// Shows native desktop notifications.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn show(&self, title: &str, body: &str, duration_hint: Duration) {
        let millis = u32::try_from(duration_hint.as_millis()).unwrap_or(u32::MAX);
        let result = Notification::new()
            .summary(title)
            .body(body)
            .appname("dropwatch")
            .timeout(Timeout::Milliseconds(millis))
            .show();

        // A broken notification daemon must not take the monitor down.
        if let Err(e) = result {
            warn!("desktop notification failed: {e}");
            info!("{title}: {}", body.replace('\n', " / "));
        }
    }
}

/// Writes notifications to the log, for `--quiet` runs.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, title: &str, body: &str, _duration_hint: Duration) {
        info!("{title}: {}", body.replace('\n', " / "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_is_silent_on_the_desktop() {
        // Smoke test: showing through the log back end never panics and
        // needs no notification daemon.
        LogNotifier.show("title", "line one\nline two", Duration::from_secs(1));
    }
}
