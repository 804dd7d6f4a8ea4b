//! Configuration handed to plugins at construction

use std::path::{Path, PathBuf};

/// Host configuration visible to a plugin
///
/// Only the base directory matters to plugins today. A config without a
/// directory is valid: plugins still construct, but anything persisted under
/// the directory (plugin storage in particular) reports an error instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginConfig {
    config_dir: Option<PathBuf>,
}

impl PluginConfig {
    /// Config rooted at an explicit directory
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(config_dir.into()),
        }
    }

    /// Config with no base directory
    pub fn without_config_dir() -> Self {
        Self { config_dir: None }
    }

    /// Resolve the platform config directory for the host application
    ///
    /// - Linux: `$XDG_CONFIG_HOME/<app>` or `~/.config/<app>`
    /// - macOS: `~/Library/Application Support/<qualifier>.<org>.<app>`
    /// - Windows: `%LOCALAPPDATA%\<org>\<app>\config`
    ///
    /// Falls back to a config without a directory when the platform reports
    /// no home directory.
    pub fn for_app(qualifier: &str, organization: &str, application: &str) -> Self {
        Self {
            config_dir: directories::ProjectDirs::from(qualifier, organization, application)
                .map(|dirs| dirs.config_local_dir().to_path_buf()),
        }
    }

    /// The base directory, if one was configured
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }
}
