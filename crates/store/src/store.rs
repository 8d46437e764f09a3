//! Thread-safe, write-through key/value store
use crate::error::{Error, Result};
use crate::file::{ConfigFile, Entries};

use keepsake_core::{DEFAULT_FILE_MODE, Normalize, StoreSettings, Value, sanitize_path};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::instrument;

/// Options applied when opening a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Permission bits for a newly created file (Unix only)
    pub mode: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { mode: DEFAULT_FILE_MODE }
    }
}

impl From<&StoreSettings> for StoreOptions {
    fn from(settings: &StoreSettings) -> Self {
        Self { mode: settings.mode }
    }
}

/// Mapping and file handle, always locked together
#[derive(Debug)]
struct State {
    entries: Entries,
    /// `None` once the store is closed
    file: Option<ConfigFile>,
}

/// A disk-backed key/value store
///
/// Reads are served from memory under a shared lock. Every [`Store::set`]
/// rewrites the whole file and syncs it before returning, holding the
/// exclusive lock for the duration, so writers are serialized and a slow disk
/// stalls readers too.
///
/// Two stores opened on the same path are not coordinated and can overwrite
/// each other's writes.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    state: RwLock<State>,
}

impl Store {
    /// Open or create the store file at `path`
    ///
    /// An empty file starts an empty store; non-empty content must decode as a
    /// mapping or [`Error::Decode`] is returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    #[instrument(skip_all, fields(path = %sanitize_path(path.as_ref())))]
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening store with mode {:#o}", options.mode);

        let mut file = ConfigFile::open(path, options.mode)?;
        let entries = file.load()?;

        tracing::info!("Store opened with {} entries", entries.len());
        Ok(Self { path: path.to_path_buf(), state: RwLock::new(State { entries, file: Some(file) }) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Option<RwLockReadGuard<'_, State>> {
        self.state.read().ok()
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| Error::Poisoned)
    }

    /// Raw tagged value for `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read_state()?.entries.get(key).cloned()
    }

    /// Text stored at `key`; `None` if absent or not text
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.read_state()?.entries.get(key)?.as_text().map(str::to_string)
    }

    /// Number stored at `key`; `None` if absent or not a number
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.read_state()?.entries.get(key)?.as_number()
    }

    /// Number stored at `key`, truncated toward zero
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_number(key).map(|n| n as i64)
    }

    /// Boolean stored at `key`; `None` if absent or not a boolean
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.read_state()?.entries.get(key)?.as_bool()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read_state().is_some_and(|state| state.entries.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.read_state().map_or(0, |state| state.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.read_state().is_none_or(|state| state.file.is_none())
    }

    /// Store `value` under `key` and flush the whole mapping to disk
    ///
    /// Values that do not normalize to text, a number, or a boolean are
    /// rejected with [`Error::Type`] and the mapping is left untouched. If the
    /// flush fails the new value stays in memory; memory and disk disagree
    /// until a later flush succeeds.
    #[instrument(skip_all, fields(path = %sanitize_path(&self.path)))]
    pub fn set<V: Normalize>(&self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        let mut guard = self.write_state()?;
        let state = &mut *guard;

        let Some(file) = state.file.as_mut() else {
            return Err(Error::already_closed(&self.path));
        };

        let value = value.normalize().map_err(|e| Error::unsupported(&key, e))?;
        tracing::debug!(key = %key, kind = value.kind(), "Setting value");

        state.entries.insert(key, value);
        file.flush(&state.entries)
    }

    /// Reload the mapping from disk and return a copy of it
    ///
    /// The reload replaces the in-memory mapping and happens under the
    /// exclusive lock. On a decode or I/O failure the previous mapping is kept.
    #[instrument(skip_all, fields(path = %sanitize_path(&self.path)))]
    pub fn get_all(&self) -> Result<Entries> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;

        let Some(file) = state.file.as_mut() else {
            return Err(Error::already_closed(&self.path));
        };

        state.entries = file.load()?;
        tracing::debug!("Reloaded {} entries", state.entries.len());
        Ok(state.entries.clone())
    }

    /// Flush once more and release the file handle
    ///
    /// A second call returns [`Error::AlreadyClosed`] without touching the
    /// file. If the final flush or sync fails the store stays open and the
    /// call can be retried.
    #[instrument(skip_all, fields(path = %sanitize_path(&self.path)))]
    pub fn close(&self) -> Result<()> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;

        let Some(file) = state.file.as_mut() else {
            return Err(Error::already_closed(&self.path));
        };
        file.flush(&state.entries)?;
        file.close()?;
        state.file = None;

        tracing::info!("Store closed");
        Ok(())
    }
}
