//! Host-side contract for certificate manager plugins
//!
//! Plugins are constructed from a [`PluginConfig`] and a name that is unique
//! per plugin instance. Host facilities such as plugin storage key their
//! behaviour off those two values and report failures through
//! [`PluginError`] and [`StorageError`].

mod config;
mod error;
pub mod logging;

pub use config::PluginConfig;
pub use error::{PluginError, StorageError};

/// Core trait implemented by every plugin instance
pub trait Plugin {
    /// Returns the unique name of this plugin instance
    fn name(&self) -> &str;

    /// Returns the host configuration the plugin was constructed with
    fn config(&self) -> &PluginConfig;
}
