use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker signalling that the published property collection changed.
/// The integer is the sole basis for staleness detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub version: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}
