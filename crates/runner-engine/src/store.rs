//! Persistence of applied resource state.
//!
//! A [`StateStore`] maps a resource instance name to its last applied
//! [`ResourceState`]. [`InMemoryStateStore`] is for tests and ephemeral use;
//! [`FileStateStore`] keeps one pretty-printed JSON document per resource.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use runner_types::ResourceState;
use tracing::debug;

use crate::error::StoreError;

/// Storage backend for resource state.
///
/// Implementations must be `Send + Sync`. Names are validated by
/// [`validate_name`] before use.
pub trait StateStore: Send + Sync {
    /// Returns `Ok(None)` if nothing is stored under `name`.
    fn read(&self, name: &str) -> Result<Option<ResourceState>, StoreError>;

    /// Create or overwrite the state for `name`.
    fn write(&self, name: &str, state: &ResourceState) -> Result<(), StoreError>;

    /// Returns `Ok(true)` if the state existed and was removed.
    fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// All stored names, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// Reject names that are empty, hidden, or not a single path component.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

/// An in-memory [`StateStore`]. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<BTreeMap<String, ResourceState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

impl StateStore for InMemoryStateStore {
    fn read(&self, name: &str) -> Result<Option<ResourceState>, StoreError> {
        validate_name(name)?;
        let states = self.states.read().map_err(poisoned)?;
        Ok(states.get(name).cloned())
    }

    fn write(&self, name: &str, state: &ResourceState) -> Result<(), StoreError> {
        validate_name(name)?;
        let mut states = self.states.write().map_err(poisoned)?;
        states.insert(name.to_string(), state.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        validate_name(name)?;
        let mut states = self.states.write().map_err(poisoned)?;
        Ok(states.remove(name).is_some())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let states = self.states.read().map_err(poisoned)?;
        Ok(states.keys().cloned().collect())
    }
}

/// A [`StateStore`] backed by `<dir>/<name>.json` files.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a reader never sees a half-written document. The
/// directory is created on first write.
#[derive(Clone, Debug)]
pub struct FileStateStore {
    dir: PathBuf,
}

const EXTENSION: &str = "json";

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }
}

impl StateStore for FileStateStore {
    fn read(&self, name: &str) -> Result<Option<ResourceState>, StoreError> {
        validate_name(name)?;
        let path = self.path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let state = serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
            name: name.to_string(),
            source,
        })?;
        Ok(Some(state))
    }

    fn write(&self, name: &str, state: &ResourceState) -> Result<(), StoreError> {
        validate_name(name)?;
        let body = serde_json::to_vec_pretty(state).map_err(|source| StoreError::Serialization {
            name: name.to_string(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(&body)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        let path = self.path(name);
        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;
        debug!(resource = name, path = %path.display(), bytes = body.len(), "wrote state");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        validate_name(name)?;
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
