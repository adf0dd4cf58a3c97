use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{StoreError, StoreResult};
use crate::config::StorageConfig;

/// Durable slot holding the serialized zine record.
pub trait Storage {
    /// `Ok(None)` when nothing has been stored yet
    fn read(&self) -> StoreResult<Option<String>>;

    fn write(&mut self, data: &str) -> StoreResult<()>;
}

/// In-memory slot. Clones share the same contents, which lets a test drop a
/// store and load a new one from the same "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(data: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(data.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> StoreResult<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn write(&mut self, data: &str) -> StoreResult<()> {
        *self.slot.lock() = Some(data.to_owned());
        Ok(())
    }
}

/// One JSON file named after the storage key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// `None` when no directory is configured
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        config.dir.as_ref().map(|dir| Self::new(dir, &config.key))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn write(&mut self, data: &str) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, data)?;
        Ok(())
    }
}
