//! Per-plugin view into the shared storage document

use crate::storage::{self, Document};
use certmgr_plugins::{Plugin, PluginConfig, PluginError, StorageError};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Lazy-load state of a [`PluginStorage`]
#[derive(Debug, Default)]
enum StorageState {
    /// Nothing read from disk yet, or the last attempt failed
    #[default]
    Uninitialized,
    /// This namespace's data, possibly modified since loading
    Ready(Map<String, Value>),
}

/// Namespaced key-value storage for one plugin instance
///
/// All plugins share a single JSON file in the host's config directory. Each
/// instance only ever reads and writes the entry keyed by its own namespace.
/// Nothing touches the disk until the first access; changes stay in memory
/// until [`save`](Self::save).
///
/// # Example
///
/// ```
/// use certmgr_plugin_storage::PluginStorage;
/// use certmgr_plugins::PluginConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let config = PluginConfig::new(dir.path());
///
/// let mut storage = PluginStorage::new(&config, "webroot");
/// storage.put("last_run", &"2026-10-19")?;
/// storage.save()?;
///
/// let mut again = PluginStorage::new(&config, "webroot");
/// assert_eq!(again.fetch_as::<String>("last_run")?.as_deref(), Some("2026-10-19"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PluginStorage {
    config_dir: Option<PathBuf>,
    namespace: String,
    storage_path: Option<PathBuf>,
    state: StorageState,
}

impl PluginStorage {
    /// Create storage for `namespace` under the config's base directory
    ///
    /// Never fails. Without a base directory every operation that needs the
    /// file reports [`StorageError::NoStoragePath`].
    pub fn new(config: &PluginConfig, namespace: impl Into<String>) -> Self {
        let mut storage = Self {
            config_dir: config.config_dir().map(Path::to_path_buf),
            namespace: namespace.into(),
            storage_path: None,
            state: StorageState::Uninitialized,
        };
        storage.initialize_storage();
        storage
    }

    /// Create storage namespaced by the plugin's name
    pub fn for_plugin<P: Plugin + ?Sized>(plugin: &P) -> Self {
        Self::new(plugin.config(), plugin.name())
    }

    /// Compute the storage file path from the base directory
    ///
    /// Performs no I/O and may be called any number of times.
    pub fn initialize_storage(&mut self) {
        self.storage_path = self.config_dir.as_deref().map(storage::storage_path);
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    /// Whether this namespace's data has been read from disk
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, StorageState::Ready(_))
    }

    /// Get the value stored under `key`
    ///
    /// Returns `Ok(None)` for a missing key. Errors only come from loading
    /// the storage file.
    pub fn fetch(&mut self, key: &str) -> Result<Option<Value>, PluginError> {
        Ok(self.data_mut()?.get(key).cloned())
    }

    /// Get the value stored under `key`, deserialized into `T`
    pub fn fetch_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, PluginError> {
        match self.fetch(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| PluginError::Deserialize {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// The value is converted to JSON immediately; one that cannot be
    /// represented fails with [`StorageError::Serialize`] and nothing is
    /// stored. The file is only written by [`save`](Self::save).
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), PluginError> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| {
            tracing::error!(
                namespace = %self.namespace,
                key = %key,
                "Could not serialize value for plugin storage: {source}"
            );
            StorageError::Serialize {
                namespace: self.namespace.clone(),
                source,
            }
        })?;
        self.data_mut()?.insert(key, value);
        Ok(())
    }

    pub fn contains(&mut self, key: &str) -> Result<bool, PluginError> {
        Ok(self.data_mut()?.contains_key(key))
    }

    /// Remove `key` from memory, returning its previous value
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, PluginError> {
        Ok(self.data_mut()?.remove(key))
    }

    /// All keys in this namespace, sorted
    pub fn keys(&mut self) -> Result<Vec<String>, PluginError> {
        let mut keys: Vec<String> = self.data_mut()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Drop in-memory data and read this namespace from disk again
    ///
    /// Unsaved changes are lost. On failure the storage is left
    /// uninitialized and the next access retries.
    pub fn reload(&mut self) -> Result<(), PluginError> {
        self.state = StorageState::Uninitialized;
        self.data_mut().map(|_| ())
    }

    /// Persist this namespace into the shared file
    ///
    /// The file is re-read right before writing so other namespaces keep
    /// whatever is currently on disk. Two processes saving at once still race;
    /// the last writer wins per namespace. If this storage was never loaded
    /// there is nothing to persist and the file is not touched.
    ///
    /// A file that exists but does not parse is never overwritten: the save
    /// fails with [`PluginError::Corrupted`] and the file is left as it is.
    pub fn save(&self) -> Result<(), PluginError> {
        let Some(path) = self.storage_path.as_deref() else {
            let err = StorageError::NoStoragePath {
                operation: "save",
                namespace: self.namespace.clone(),
            };
            tracing::error!(namespace = %self.namespace, "{err}");
            return Err(err.into());
        };

        let StorageState::Ready(data) = &self.state else {
            tracing::debug!(namespace = %self.namespace, "plugin storage never loaded, nothing to save");
            return Ok(());
        };

        let mut document =
            storage::read_document_for_merge(path).map_err(|source| corrupted(path, source))?;
        document.insert(self.namespace.clone(), Value::Object(data.clone()));

        let bytes = serde_json::to_vec_pretty(&document).map_err(|source| {
            tracing::error!(
                namespace = %self.namespace,
                "Could not serialize plugin storage data: {source}"
            );
            StorageError::Serialize {
                namespace: self.namespace.clone(),
                source,
            }
        })?;

        storage::write_contents(path, &bytes).map_err(|source| {
            tracing::error!(
                path = %path.display(),
                "Could not write plugin storage file: {source}"
            );
            StorageError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!(namespace = %self.namespace, path = %path.display(), "saved plugin storage");
        Ok(())
    }

    fn data_mut(&mut self) -> Result<&mut Map<String, Value>, PluginError> {
        match self.state {
            StorageState::Ready(ref mut data) => Ok(data),
            StorageState::Uninitialized => {
                self.state = StorageState::Ready(self.load()?);
                self.data_mut()
            }
        }
    }

    /// Read this namespace's data from the shared file
    fn load(&self) -> Result<Map<String, Value>, PluginError> {
        let Some(path) = self.storage_path.as_deref() else {
            let err = StorageError::NoStoragePath {
                operation: "load",
                namespace: self.namespace.clone(),
            };
            tracing::error!(namespace = %self.namespace, "{err}");
            return Err(err.into());
        };

        let contents = match storage::read_contents(path) {
            Ok(Some(contents)) => contents,
            Ok(None) => return Ok(Map::new()),
            Err(source) => {
                tracing::error!(
                    path = %path.display(),
                    "Could not read plugin storage file: {source}"
                );
                return Err(StorageError::Read {
                    path: path.to_path_buf(),
                    source,
                }
                .into());
            }
        };

        let document = match storage::parse_document(&contents) {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::debug!(
                    path = %path.display(),
                    "Plugin storage file was empty, no values loaded"
                );
                return Ok(Map::new());
            }
            Err(source) => return Err(corrupted(path, source)),
        };

        self.namespace_data(document, path)
    }

    fn namespace_data(
        &self,
        mut document: Document,
        path: &Path,
    ) -> Result<Map<String, Value>, PluginError> {
        match document.remove(&self.namespace) {
            None => Ok(Map::new()),
            Some(Value::Object(data)) => Ok(data),
            Some(other) => {
                serde_json::from_value(other).map_err(|source| corrupted(path, source))
            }
        }
    }
}

fn corrupted(path: &Path, source: serde_json::Error) -> PluginError {
    tracing::error!(
        path = %path.display(),
        "Plugin storage file {} is corrupted: {source}",
        path.display()
    );
    PluginError::Corrupted {
        path: path.to_path_buf(),
        source,
    }
}
