//! Persistent agent settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Settings the agent keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory currently selected for monitoring.
    pub watched_path: Option<PathBuf>,
}

impl Settings {
    /// Set the watched directory.
    pub fn with_watched_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.watched_path = Some(path.into());
        self
    }
}

/// Storage for agent settings.
pub trait ConfigStore: Send + Sync {
    /// Load settings, or `None` when nothing usable is stored.
    fn load(&self) -> Option<Settings>;

    /// Persist settings.
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// JSON file-backed settings store.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional per-user location.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir().unwrap_or_default().join("dropwatch");
        Self::new(dir.join("config.json"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Option<Settings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("no settings at {}: {e}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("ignoring unreadable settings {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(settings)?;

        // Write atomically
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        debug!("saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn settings_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));

        let settings = Settings::default().with_watched_path("/home/user/drops");
        store.save(&settings).unwrap();

        assert_eq!(store.load(), Some(settings));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));

        assert_eq!(store.load(), None);
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonConfigStore::new(path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("nested/deeper/config.json"));

        store.save(&Settings::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_replaces_previous_settings() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json"));

        store
            .save(&Settings::default().with_watched_path("/old"))
            .unwrap();
        store
            .save(&Settings::default().with_watched_path("/new"))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.watched_path.as_deref(), Some(Path::new("/new")));
    }
}
