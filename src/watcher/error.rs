//! Error types for the watch session.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the watch session from starting or running.
///
/// Per-file compile and write failures are not represented here; they are
/// contained at the file level and never abort the consumer loop.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("change stream closed unexpectedly")]
    ChannelClosed,
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
