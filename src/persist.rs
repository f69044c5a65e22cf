//! Persistence ports and the load/save adapter around them
use super::error::PersistError;
use super::item::{InventoryItem, InventoryState};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Fixed key every snapshot is stored under.
pub const STORAGE_KEY: &str = "transfoStockInventory";

/// Where snapshots live. `read` returns `Ok(None)` when nothing has been
/// stored yet and an error when something is stored but unusable.
pub trait SnapshotPort {
    fn read(&self) -> Result<Option<InventoryState>, PersistError>;
    fn write(&self, state: &InventoryState) -> Result<(), PersistError>;
}

impl<P: SnapshotPort + ?Sized> SnapshotPort for Box<P> {
    fn read(&self) -> Result<Option<InventoryState>, PersistError> {
        (**self).read()
    }
    fn write(&self, state: &InventoryState) -> Result<(), PersistError> {
        (**self).write(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Synced,
    Saving,
}

/// Owns a port and absorbs its failures. Nothing here is ever fatal: a bad
/// read falls back to seed data and a bad write is logged and dropped.
pub struct Persistence<P> {
    port: P,
    sync: SyncState,
    failed_saves: u64,
}

impl<P: SnapshotPort> Persistence<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            sync: SyncState::Uninitialized,
            failed_saves: 0,
        }
    }

    pub fn load(&mut self, seed: impl FnOnce() -> Vec<InventoryItem>) -> InventoryState {
        let state = match self.port.read() {
            Ok(Some(state)) => {
                info!(items = state.items.len(), "loaded inventory snapshot");
                state
            }
            Ok(None) => {
                info!("no inventory snapshot stored, starting from seed data");
                InventoryState::new(seed())
            }
            Err(e) => {
                error!(error = %e, "failed to read inventory snapshot, falling back to seed data");
                InventoryState::new(seed())
            }
        };
        self.sync = SyncState::Synced;
        state
    }

    /// Writes the full state. Returns whether the write landed.
    pub fn save(&mut self, state: &InventoryState) -> bool {
        self.sync = SyncState::Saving;
        let saved = match self.port.write(state) {
            Ok(()) => {
                debug!(items = state.items.len(), "saved inventory snapshot");
                true
            }
            Err(e) => {
                self.failed_saves += 1;
                error!(
                    error = %e,
                    failed_saves = self.failed_saves,
                    "failed to save inventory snapshot, keeping in-memory state"
                );
                false
            }
        };
        self.sync = SyncState::Synced;
        saved
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }
    pub fn failed_saves(&self) -> u64 {
        self.failed_saves
    }
    pub fn port(&self) -> &P {
        &self.port
    }
    pub fn into_port(self) -> P {
        self.port
    }
}

/// Snapshot stored as JSON bytes under a single sled key.
pub struct SledPort {
    instance: Arc<sled::Db>,
    key: String,
}

impl SledPort {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self {
            instance,
            key: STORAGE_KEY.to_string(),
        }
    }
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let db = sled::open(path)?;
        Ok(Self::new(Arc::new(db)))
    }
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl SnapshotPort for SledPort {
    fn read(&self) -> Result<Option<InventoryState>, PersistError> {
        match self.instance.get(self.key.as_bytes())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(PersistError::Decode),
            None => Ok(None),
        }
    }
    fn write(&self, state: &InventoryState) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec(state).map_err(PersistError::Encode)?;
        self.instance.insert(self.key.as_bytes(), bytes)?;
        self.instance.flush()?;
        Ok(())
    }
}

/// Snapshot stored as a single JSON file, replaced atomically via rename.
pub struct JsonFilePort {
    path: PathBuf,
}

impl JsonFilePort {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotPort for JsonFilePort {
    fn read(&self) -> Result<Option<InventoryState>, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(PersistError::Decode)
    }
    fn write(&self, state: &InventoryState) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(state).map_err(PersistError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// In-process port. Clones share the same slot, so dropping a store and
/// loading a new one from a clone behaves like a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryPort {
    slot: Rc<RefCell<Option<Vec<u8>>>>,
    quota: Option<usize>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }
    /// Writes larger than `bytes` fail with `QuotaExceeded`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }
    /// Starts out holding `raw`, whether or not it parses.
    pub fn with_raw(raw: impl Into<Vec<u8>>) -> Self {
        let port = Self::default();
        port.slot.replace(Some(raw.into()));
        port
    }
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.slot.borrow().clone()
    }
}

impl SnapshotPort for MemoryPort {
    fn read(&self) -> Result<Option<InventoryState>, PersistError> {
        match self.slot.borrow().as_deref() {
            Some(bytes) => serde_json::from_slice(bytes)
                .map(Some)
                .map_err(PersistError::Decode),
            None => Ok(None),
        }
    }
    fn write(&self, state: &InventoryState) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec(state).map_err(PersistError::Encode)?;
        if let Some(quota) = self.quota.filter(|quota| bytes.len() > *quota) {
            warn!(needed = bytes.len(), quota, "memory port quota exceeded");
            return Err(PersistError::QuotaExceeded {
                needed: bytes.len(),
                quota,
            });
        }
        self.slot.replace(Some(bytes));
        Ok(())
    }
}
