//! Plugin storage for the certificate manager
//!
//! A small persistent key-value store for plugins that need to remember
//! state between runs. Every plugin instance gets its own namespace inside
//! one shared JSON file, `<config_dir>/.pluginstorage.json`:
//!
//! ```json
//! {"webroot": {"last_run": "2026-10-19"}, "dns-cloud": {"zone_id": 42}}
//! ```
//!
//! # Features
//!
//! - Lazy loading: the file is read on first access, not at construction
//! - Namespace isolation: a plugin only ever sees its own keys
//! - Merge on save: other namespaces are re-read and preserved
//! - Owner-only file permissions
//!
//! # Example
//!
//! ```
//! use certmgr_plugin_storage::PluginStorage;
//! use certmgr_plugins::{Plugin, PluginConfig};
//!
//! struct Webroot {
//!     config: PluginConfig,
//! }
//!
//! impl Plugin for Webroot {
//!     fn name(&self) -> &str {
//!         "webroot"
//!     }
//!
//!     fn config(&self) -> &PluginConfig {
//!         &self.config
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! let plugin = Webroot { config: PluginConfig::new(dir.path()) };
//! let mut storage = PluginStorage::for_plugin(&plugin);
//!
//! if storage.fetch("challenge_dir")?.is_none() {
//!     storage.put("challenge_dir", &"/var/www/.well-known")?;
//!     storage.save()?;
//! }
//! # Ok(())
//! # }
//! ```

mod plugin_storage;
mod storage;

pub use plugin_storage::PluginStorage;
pub use storage::{Document, STORAGE_FILE_NAME, storage_path};
