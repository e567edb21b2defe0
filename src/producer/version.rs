use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::version::VersionRecord;

/// Owns the version marker file. Not safe under concurrent invocation;
/// callers go through the admin orchestrator's mutation lock.
pub struct VersionService {
    path: PathBuf,
}

impl VersionService {
    pub fn new(path: impl Into<PathBuf>) -> VersionService {
        VersionService { path: path.into() }
    }

    /// Missing or corrupt marker reads as absent, which bumps to 1.
    pub fn current(&self) -> Option<VersionRecord> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn bump(&self, reason: &str) -> Result<VersionRecord> {
        let current = self.current().map(|record| record.version).unwrap_or(0);
        let next = VersionRecord {
            version: current + 1,
            updated_at: Utc::now(),
            description: reason.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data dir {}", parent.display()))?;
        }
        let mut raw = serde_json::to_string_pretty(&next)?;
        raw.push('\n');
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        Ok(next)
    }
}
