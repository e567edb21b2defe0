use log::error;
use serde::Serialize;

use crate::clients::remote::RemoteSource;
use crate::store::LocalState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVersionResult {
    pub has_update: bool,
    pub local_version: Option<u64>,
    pub remote_version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An absent local version always reads as outdated. Equal or lower remote
/// values never trigger a refetch.
pub fn has_update(local: Option<u64>, remote: u64) -> bool {
    match local {
        Some(local) => remote > local,
        None => true,
    }
}

/// Compares the published version marker against the last one saved
/// locally. Network failure is reported in the result, never raised; the
/// caller falls back to whatever data it already has.
pub async fn check_version(remote: &dyn RemoteSource, state: &LocalState) -> CheckVersionResult {
    let local_version = state.version();

    match remote.fetch_version().await {
        Ok(record) => CheckVersionResult {
            has_update: has_update(local_version, record.version),
            local_version,
            remote_version: Some(record.version),
            error: None,
        },
        Err(e) => {
            error!("Error while checking data version: {}", e);
            CheckVersionResult {
                has_update: false,
                local_version,
                remote_version: None,
                error: Some(e.to_string()),
            }
        }
    }
}
