use dotenvy::dotenv;
use log::error;
use serde::Deserialize;
use std::env;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    /// Root of the data repository checkout the producer publishes from.
    pub repo_path: String,
    /// Directory inside the checkout holding the published files.
    pub data_dir: String,
    /// Public raw-content prefix the data directory is served under; image
    /// links are built from it.
    pub raw_base_url: String,
    pub remote_data_url: String,
    pub remote_version_url: String,
    pub store_path: String,
    pub fallback_data_path: Option<String>,
    pub poll_interval_seconds: u32,
    pub request_timeout_seconds: u32,
    pub git_remote: String,
    pub git_branch: String,
    pub image_max_dimension: u32,
    pub image_quality: u8,
    pub image_concurrency: u32,
    pub http_bind_address: Option<String>,
}

pub fn create_test_config() -> Config {
    Config {
        repo_path: "xxx".to_string(),
        data_dir: "data".to_string(),
        raw_base_url: "https://raw.example.com/listings/main/data".to_string(),
        remote_data_url: "https://raw.example.com/listings/main/data/data_property.json"
            .to_string(),
        remote_version_url: "https://raw.example.com/listings/main/data/version.json".to_string(),
        store_path: "xxx".to_string(),
        fallback_data_path: None,
        poll_interval_seconds: 60,
        request_timeout_seconds: 10,
        git_remote: "origin".to_string(),
        git_branch: "main".to_string(),
        image_max_dimension: 1080,
        image_quality: 80,
        image_concurrency: 4,
        http_bind_address: None,
    }
}

pub fn read_config() -> Config {
    dotenv().ok();
    env::var(CONFIG_PATH_ENV)
        .map_err(|_| format!("{CONFIG_PATH_ENV} .env not set"))
        .and_then(|config_path| std::fs::read(config_path).map_err(|e| e.to_string()))
        .and_then(|bytes| toml::from_slice(&bytes).map_err(|e| e.to_string()))
        .unwrap_or_else(|err| {
            error!("failed to read config: {err}");
            std::process::exit(1);
        })
}
