//! Error classes raised to plugins by host facilities

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Operational failure of plugin storage
///
/// Recoverable from the plugin's point of view: it may skip persistence and
/// carry on, but the failure is always reported.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unable to {operation} plugin storage for `{namespace}`: no storage path configured")]
    NoStoragePath {
        operation: &'static str,
        namespace: String,
    },

    #[error("Could not read plugin storage file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not serialize plugin storage data for `{namespace}`: {source}")]
    Serialize {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not write plugin storage file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure surfaced to a plugin
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The storage file exists and has content, but it is not valid JSON.
    /// Never repaired automatically.
    #[error("Plugin storage file {} is corrupted: {source}", .path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored value for `{key}` has an unexpected shape: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PluginError {
    /// True when the failure points at damaged data on disk rather than an
    /// operational hiccup
    pub fn is_corruption(&self) -> bool {
        matches!(self, PluginError::Corrupted { .. })
    }
}
