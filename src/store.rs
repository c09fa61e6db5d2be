//! Durable key-value maps for the visited ledger and the metadata database.
//!
//! Both databases are plain JSON objects on disk, one key per media item:
//!
//! ```json
//! {
//!   "cats/nap.jpg": true,
//!   "dogs/run.mp4": true
//! }
//! ```
//!
//! This is the same file layout the older pickle-db based bot wrote, so its
//! `visited` and `info` files open as-is. Its `visited` keys carried the media
//! root as a prefix; [`crate::ledger`] deals with that, not this module.
//!
//! ## Durability
//!
//! [`JsonFileStore`] keeps the whole map in memory. With `auto_dump` enabled
//! every [`set`](KvStore::set) rewrites the file before returning: the JSON is
//! written to a sibling temp file and renamed over the original, so a crash
//! mid-write leaves either the old or the new map, never a truncated one.
//!
//! A missing file is an empty store. A file that exists but does not parse is
//! an error: silently starting from an empty ledger would repost everything.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot serialize entries for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A string-keyed map of JSON values that outlives the process.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// JSON-object file backed store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
    auto_dump: bool,
}

impl JsonFileStore {
    /// Load the store at `path`. A missing file yields an empty store.
    pub fn open(path: &Path, auto_dump: bool) -> Result<Self, StoreError> {
        let entries = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            auto_dump,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole map to disk (temp file + rename).
    pub fn dump(&self) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        if self.auto_dump {
            self.dump()?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// Process-local store. Nothing is persisted.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
