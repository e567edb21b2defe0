use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{error, info, warn};
use tokio::sync::broadcast;

use crate::clients::remote::RemoteSource;
use crate::config::Config;
use crate::consumer::pipeline;
use crate::consumer::version_check::{check_version, CheckVersionResult};
use crate::models::filters::{FilterSet, SortOrder};
use crate::models::property::{map_points, MapPoint, Property};
use crate::store::LocalState;

/// Consumer half: keeps the local property cache current against the
/// published data and answers view queries from it.
pub struct Viewer {
    config: Arc<Config>,
    remote: Arc<dyn RemoteSource>,
    state: LocalState,
    refreshing: tokio::sync::Mutex<()>,
}

impl Viewer {
    pub fn new(config: Arc<Config>, remote: Arc<dyn RemoteSource>, state: LocalState) -> Viewer {
        Viewer {
            config,
            remote,
            state,
            refreshing: tokio::sync::Mutex::new(()),
        }
    }

    /// One sync cycle: check the version marker, refetch the collection only
    /// when it moved, fall back to cache or the bundled dataset on failure.
    /// A refresh already in flight is not re-entered; late callers get the
    /// current cache.
    pub async fn refresh(&self) -> Vec<Property> {
        let _guard = match self.refreshing.try_lock() {
            Ok(guard) => guard,
            Err(_) => return self.state.properties().unwrap_or_default(),
        };

        let check = check_version(self.remote.as_ref(), &self.state).await;

        if !check.has_update {
            if let Some(cached) = self.state.properties() {
                return cached;
            }
        }

        match self.remote.fetch_properties(check.remote_version).await {
            Ok(properties) => {
                match self.state.save_properties(&properties) {
                    Ok(()) => {
                        // Only mark the cache current once the data itself
                        // is stored, otherwise a restart would serve the old
                        // cache as fresh.
                        if let Some(remote_version) = check.remote_version {
                            if let Err(e) = self.state.save_version(remote_version) {
                                warn!("Error while saving data version: {}", e);
                            }
                        }
                    }
                    Err(e) => warn!("Error while caching property data: {}", e),
                }
                info!(
                    "Fetched {} properties at remote version {:?}",
                    properties.len(),
                    check.remote_version
                );
                properties
            }
            Err(e) => {
                error!("Error while fetching property data: {}", e);
                self.fallback()
            }
        }
    }

    /// Cache first, then the bundled dataset, then empty. Never an error.
    fn fallback(&self) -> Vec<Property> {
        if let Some(cached) = self.state.properties() {
            return cached;
        }

        if let Some(path) = &self.config.fallback_data_path {
            match std::fs::read_to_string(path) {
                Ok(raw) => match serde_json::from_str::<Vec<Property>>(&raw) {
                    Ok(properties) => {
                        if let Err(e) = self.state.save_properties(&properties) {
                            warn!("Error while caching fallback dataset: {}", e);
                        }
                        return properties;
                    }
                    Err(e) => warn!("Error while decoding fallback dataset {}: {}", path, e),
                },
                Err(e) => warn!("Error while reading fallback dataset {}: {}", path, e),
            }
        }

        Vec::new()
    }

    /// Periodic sync loop, one fetch at a time, stopped by the shutdown
    /// broadcast.
    pub async fn run(
        &self,
        shutdown: Arc<AtomicBool>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let interval = Duration::from_secs(self.config.poll_interval_seconds.into());

        while !shutdown.load(Ordering::Acquire) {
            info!("Starting viewer sync run");
            let start = Instant::now();

            let properties = self.refresh().await;

            info!(
                "Finished viewer sync run with {} properties in {:?}",
                properties.len(),
                start.elapsed()
            );

            tokio::select! {
               _ = tokio::time::sleep(interval) => {}
               _ = shutdown_rx.recv() => {
                   break
               }
            }
        }
        Ok(())
    }

    pub async fn check(&self) -> CheckVersionResult {
        check_version(self.remote.as_ref(), &self.state).await
    }

    /// Cached collection through the filter/search/sort pipeline.
    pub fn view(&self, search: &str) -> Vec<Property> {
        let properties = self.state.properties().unwrap_or_default();
        let filters = self.state.filters();
        let order = self.state.sort_order();
        pipeline::derive_view(&properties, &filters, search, order)
    }

    pub fn points(&self, search: &str) -> Vec<MapPoint> {
        map_points(&self.view(search))
    }

    pub fn filters(&self) -> FilterSet {
        self.state.filters()
    }

    pub fn set_filters(&self, filters: &FilterSet) -> Result<()> {
        self.state.save_filters(filters)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.state.sort_order()
    }

    pub fn set_sort_order(&self, order: SortOrder) -> Result<()> {
        self.state.save_sort_order(order)
    }
}
