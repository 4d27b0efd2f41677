//! Persistent key-value store: the page's `localStorage`.
//!
//! The file-backed store is a flat TOML table of strings at
//! `$XDG_CONFIG_HOME/scrollfx/storage.toml` (default
//! `~/.config/scrollfx/storage.toml`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store; never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.into(), value.into());
        Ok(())
    }
}

/// File-backed store.  Every `set` rewrites the whole file so a crash never
/// leaves a half-applied preference behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.  A missing or unreadable
    /// file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => parse_entries(&path, &contents),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "store not readable, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Open the store at the default location.
    pub fn open_default() -> Self {
        Self::open(default_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let contents = toml::to_string(&self.entries)?;
        std::fs::write(&self.path, contents).map_err(|source| {
            StoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidKey(key.into()));
        }
        self.entries.insert(key.into(), value.into());
        self.flush()
    }
}

/// String entries of a TOML table.  Other value types are skipped; a file
/// that is not TOML at all starts the store empty.
fn parse_entries(path: &Path, contents: &str) -> BTreeMap<String, String> {
    let table = match toml::from_str::<toml::Table>(contents) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "store is not valid TOML, starting empty");
            return BTreeMap::new();
        }
    };
    table
        .into_iter()
        .filter_map(|(key, value)| match value {
            toml::Value::String(s) => Some((key, s)),
            other => {
                tracing::debug!(key = %key, kind = other.type_str(), "skipping non-string store entry");
                None
            }
        })
        .collect()
}

/// Return the storage file path (`$XDG_CONFIG_HOME/scrollfx/storage.toml`).
pub fn default_store_path() -> PathBuf {
    crate::config::config_dir().join("storage.toml")
}
