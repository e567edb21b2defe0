use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};

use crate::config::Config;
use crate::models::property::Property;
use crate::models::version::VersionRecord;

/// The raw-content endpoints publishing the property collection and its
/// version marker.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches the version marker, bypassing intermediate caches.
    async fn fetch_version(&self) -> Result<VersionRecord>;

    /// Fetches the full property collection, cache-busted with the version
    /// number when one is known.
    async fn fetch_properties(&self, version_tag: Option<u64>) -> Result<Vec<Property>>;
}

#[derive(Debug, Clone)]
pub struct RemoteDataClient {
    client: reqwest::Client,
    data_url: String,
    version_url: String,
}

impl RemoteDataClient {
    pub fn new(config: &Config) -> Result<RemoteDataClient> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.into()))
            .build()?;

        Ok(RemoteDataClient {
            client,
            data_url: config.remote_data_url.clone(),
            version_url: config.remote_version_url.clone(),
        })
    }
}

#[async_trait]
impl RemoteSource for RemoteDataClient {
    async fn fetch_version(&self) -> Result<VersionRecord> {
        let mut headers: HeaderMap = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let response = self
            .client
            .get(&self.version_url)
            .headers(headers)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to fetch version marker: {}",
                response.status()
            ));
        }

        Ok(response.json::<VersionRecord>().await?)
    }

    async fn fetch_properties(&self, version_tag: Option<u64>) -> Result<Vec<Property>> {
        let mut request = self.client.get(&self.data_url);
        if let Some(tag) = version_tag {
            request = request.query(&[("v", tag.to_string())]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to fetch property data: {}",
                response.status()
            ));
        }

        Ok(response.json::<Vec<Property>>().await?)
    }
}
