pub mod json_file;
pub mod memory;

use std::sync::Arc;

use anyhow::Result;

use crate::models::filters::{FilterSet, SortOrder};
use crate::models::property::Property;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub const VERSION_KEY: &str = "data_property_version";
pub const PROPERTIES_KEY: &str = "properties";
pub const FILTERS_KEY: &str = "filters";
pub const SORT_ORDER_KEY: &str = "sort_order";

/// Persistent key/value state surviving restarts. The viewer never talks to
/// a storage mechanism directly; everything goes through this seam so the
/// pipeline stays testable against an in-memory store.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Typed view over the raw store. Absent or malformed entries read as a
/// cache miss, never as an error.
#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn StateStore>,
}

impl LocalState {
    pub fn new(store: Arc<dyn StateStore>) -> LocalState {
        LocalState { store }
    }

    pub fn version(&self) -> Option<u64> {
        self.raw(VERSION_KEY)?.trim().parse().ok()
    }

    pub fn save_version(&self, version: u64) -> Result<()> {
        self.store.set(VERSION_KEY, &version.to_string())
    }

    pub fn properties(&self) -> Option<Vec<Property>> {
        serde_json::from_str(&self.raw(PROPERTIES_KEY)?).ok()
    }

    pub fn save_properties(&self, properties: &[Property]) -> Result<()> {
        self.store.set(PROPERTIES_KEY, &serde_json::to_string(properties)?)
    }

    pub fn filters(&self) -> FilterSet {
        self.raw(FILTERS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save_filters(&self, filters: &FilterSet) -> Result<()> {
        self.store.set(FILTERS_KEY, &serde_json::to_string(filters)?)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.raw(SORT_ORDER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save_sort_order(&self, order: SortOrder) -> Result<()> {
        self.store.set(SORT_ORDER_KEY, &serde_json::to_string(&order)?)
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.store.get(key).ok().flatten()
    }
}
