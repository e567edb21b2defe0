use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::models::property::Property;

/// Reads and writes the published property collection as one JSON array
/// file, whole-file read-modify-write. Id uniqueness is enforced here, not
/// by convention.
pub struct PropertyRepository {
    path: PathBuf,
}

impl PropertyRepository {
    pub fn new(path: impl Into<PathBuf>) -> PropertyRepository {
        PropertyRepository { path: path.into() }
    }

    /// A missing file is an empty collection. A malformed file is an error:
    /// silently reading it as empty would let the next write erase the
    /// collection.
    pub fn get_all(&self) -> Result<Vec<Property>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed property file {}", self.path.display()))
    }

    pub fn save_all(&self, properties: &[Property]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data dir {}", parent.display()))?;
        }
        let mut raw = serde_json::to_string_pretty(properties)?;
        raw.push('\n');
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    pub fn add(&self, property: Property) -> Result<()> {
        let mut all = self.get_all()?;
        if all.iter().any(|existing| existing.id == property.id) {
            bail!("a property with id {} already exists", property.id);
        }
        all.push(property);
        self.save_all(&all)
    }

    pub fn update(&self, id: &str, property: Property) -> Result<()> {
        let mut all = self.get_all()?;
        let Some(index) = all.iter().position(|existing| existing.id == id) else {
            bail!("no property with id {}", id);
        };
        if property.id != id
            && all
                .iter()
                .any(|existing| existing.id == property.id)
        {
            bail!("a property with id {} already exists", property.id);
        }
        all[index] = property;
        self.save_all(&all)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut all = self.get_all()?;
        let before = all.len();
        all.retain(|existing| existing.id != id);
        if all.len() == before {
            bail!("no property with id {}", id);
        }
        self.save_all(&all)
    }
}
