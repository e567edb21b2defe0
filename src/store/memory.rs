use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use super::StateStore;

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    cells: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let cells = self.cells.lock().unwrap_or_else(|err| err.into_inner());
        Ok(cells.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cells = self.cells.lock().unwrap_or_else(|err| err.into_inner());
        cells.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
