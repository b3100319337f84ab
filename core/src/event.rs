//! Detection events produced by an active watch.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use notify::EventKind;

/// A new file observed in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionEvent {
    /// Base name of the created file.
    pub file_name: String,

    /// Full path to the created file.
    pub path: PathBuf,

    /// When the file was detected.
    pub detected_at: DateTime<Local>,
}

impl DetectionEvent {
    /// Build an event for a created path, if it names a regular file.
    ///
    /// Returns `None` for directories, for paths that vanished before the
    /// metadata check, and for paths without a base name. None of those
    /// become detections.
    pub fn for_created_path(path: &Path) -> Option<Self> {
        let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            return None;
        }

        let file_name = path.file_name()?.to_string_lossy().into_owned();

        Some(Self {
            file_name,
            path: path.to_path_buf(),
            detected_at: Local::now(),
        })
    }
}

/// Whether a notify event may describe fresh file creations.
///
/// Creation kinds vary by platform backend (`File` on inotify, often `Any`
/// elsewhere), so every `Create` passes here and the per-path metadata
/// check in [`DetectionEvent::for_created_path`] drops directories.
pub(crate) fn is_creation(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use tempfile::TempDir;

    #[test]
    fn creation_kinds_pass_the_filter() {
        assert!(is_creation(&EventKind::Create(CreateKind::File)));
        assert!(is_creation(&EventKind::Create(CreateKind::Any)));
        assert!(is_creation(&EventKind::Create(CreateKind::Folder)));

        assert!(!is_creation(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_creation(&EventKind::Remove(notify::event::RemoveKind::Any)));
        assert!(!is_creation(&EventKind::Any));
    }

    #[test]
    fn regular_files_become_events() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"data").unwrap();

        let event = DetectionEvent::for_created_path(&path).unwrap();
        assert_eq!(event.file_name, "report.pdf");
        assert_eq!(event.path, path);
    }

    #[test]
    fn directories_are_discarded() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("incoming");
        std::fs::create_dir(&sub).unwrap();

        assert!(DetectionEvent::for_created_path(&sub).is_none());
    }

    #[test]
    fn vanished_paths_are_discarded() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("never-existed.txt");

        assert!(DetectionEvent::for_created_path(&gone).is_none());
    }
}
