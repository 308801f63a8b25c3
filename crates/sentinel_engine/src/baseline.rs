//! Durable store for the last observed item list per monitor key.
//!
//! Every failure path reads as "no baseline" or is logged and dropped. The
//! monitor keeps running whatever the disk does.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use sentinel_logging::{sentinel_debug, sentinel_error, sentinel_warn};
use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};
use crate::{ItemList, MonitorKey};

pub const BASELINE_FILENAME: &str = ".sentinel_baselines.ron";

pub trait BaselineStore: Send + Sync {
    /// Returns `None` when the key was never observed or the store is unavailable.
    fn get(&self, key: &MonitorKey) -> Option<ItemList>;
    /// Replaces the whole baseline for `key`.
    fn set(&self, key: &MonitorKey, items: &ItemList);
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedBaselines {
    #[serde(default)]
    baselines: BTreeMap<MonitorKey, ItemList>,
}

/// All baselines live in one RON document inside the state directory.
pub struct FileBaselineStore {
    writer: AtomicFileWriter,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileBaselineStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(state_dir),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(BASELINE_FILENAME)
    }

    fn load(&self) -> Option<PersistedBaselines> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                sentinel_debug!("No baseline file at {:?}", path);
                return None;
            }
            Err(err) => {
                sentinel_warn!("Failed to read baselines from {:?}: {}", path, err);
                return None;
            }
        };

        match ron::from_str::<PersistedBaselines>(&content) {
            Ok(state) => Some(state),
            Err(err) => {
                sentinel_warn!("Failed to parse baselines from {:?}: {}", path, err);
                None
            }
        }
    }

    fn save(&self, state: &PersistedBaselines) -> Result<PathBuf, PersistError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(state, pretty)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        self.writer.write(BASELINE_FILENAME, &content)
    }
}

impl BaselineStore for FileBaselineStore {
    fn get(&self, key: &MonitorKey) -> Option<ItemList> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()?.baselines.get(key).cloned()
    }

    fn set(&self, key: &MonitorKey, items: &ItemList) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.load().unwrap_or_default();
        state.baselines.insert(key.clone(), items.clone());
        match self.save(&state) {
            Ok(path) => sentinel_debug!(
                "Stored baseline {} ({} items) in {:?}",
                key,
                items.len(),
                path
            ),
            Err(err) => sentinel_error!(
                "Failed to store baseline {} in {:?}: {}",
                key,
                self.writer.dir(),
                err
            ),
        }
    }
}

/// In-process store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBaselineStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    baselines: HashMap<MonitorKey, ItemList>,
    writes: usize,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .writes
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn get(&self, key: &MonitorKey) -> Option<ItemList> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .baselines
            .get(key)
            .cloned()
    }

    fn set(&self, key: &MonitorKey, items: &ItemList) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.baselines.insert(key.clone(), items.clone());
        inner.writes += 1;
    }
}
