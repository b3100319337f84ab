//! Error types for the monitor engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur while controlling the monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Path is empty, relative, missing, or not a directory.
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Path exists but cannot be read.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The platform watcher could not be registered.
    #[error("watch setup failed: {0}")]
    WatchSetup(#[from] notify::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn messages_name_the_offending_path() {
        let err = MonitorError::InvalidPath(Path::new("/no/such/dir").to_path_buf());
        assert_eq!(err.to_string(), "invalid path: /no/such/dir");

        let err = MonitorError::PermissionDenied(Path::new("/root/locked").to_path_buf());
        assert_eq!(err.to_string(), "permission denied: /root/locked");
    }
}
