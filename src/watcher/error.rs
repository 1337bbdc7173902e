//! Error types for the configuration watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Hot-reload could not be set up. Never fatal: the daemon keeps serving the
/// configuration it already loaded.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {}: {reason}", path.display())]
    PathWatchFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
