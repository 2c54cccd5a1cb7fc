use std::fs;
use std::path::PathBuf;

use crate::types::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capability: load and save the keyed record set for one watch. Each state
/// key is exclusive to its watch, so no locking is needed in the sequential
/// loop.
pub trait SnapshotStore {
    fn load(&self, key: &str) -> Result<Snapshot, StoreError>;
    fn save(&self, key: &str, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// One pretty-printed JSON file per state key under a common directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Snapshot, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            // First run for this watch.
            return Ok(Snapshot::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, key: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }
}
