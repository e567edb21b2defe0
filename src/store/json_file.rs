use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::warn;

use super::StateStore;

/// File-backed store: one JSON object mapping keys to string values,
/// rewritten whole on every set.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(cells) => cells,
            Err(err) => {
                warn!(
                    "Malformed state file {}, treating as empty: {}",
                    self.path.display(),
                    err
                );
                BTreeMap::new()
            }
        }
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|err| err.into_inner());
        let mut cells = self.load();
        cells.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state dir {}", parent.display()))?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&cells)?)
            .with_context(|| format!("failed to write state file {}", self.path.display()))?;
        Ok(())
    }
}
