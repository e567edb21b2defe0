use std::sync::{
    atomic::AtomicBool,
    Arc,
};

use anyhow::Result;
use log::error;
use tokio::sync::broadcast;

use inmo::clients::remote::RemoteDataClient;
use inmo::config::{self, Config};
use inmo::consumer::viewer::Viewer;
use inmo::logger::setup_logger;
use inmo::producer::admin::AdminService;
use inmo::store::{JsonFileStore, LocalState};
use inmo::web::{start_http_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    setup_logger()?;

    let config: Arc<Config> = Arc::new(config::read_config());

    let shutdown = Arc::new(AtomicBool::new(false));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))?;

    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::task::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(());
            }
        });
    }

    let remote = Arc::new(RemoteDataClient::new(&config)?);
    let state = LocalState::new(Arc::new(JsonFileStore::new(&config.store_path)));
    let viewer = Arc::new(Viewer::new(config.clone(), remote, state));
    let admin = Arc::new(AdminService::new(&config));

    // Viewer sync loop
    let viewer_handle = {
        let viewer = viewer.clone();
        let shutdown = shutdown.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::task::spawn(async move { viewer.run(shutdown, shutdown_rx).await })
    };

    // Admin + viewer HTTP surface
    let server_handle = {
        let app_state = AppState {
            config: config.clone(),
            admin,
            viewer,
        };
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::task::spawn(async move { start_http_server(app_state, shutdown_rx).await })
    };

    if let Err(err) = tokio::try_join!(viewer_handle, server_handle) {
        error!("Error: {:?}", err)
    }

    Ok(())
}
