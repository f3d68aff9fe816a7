use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use homematch::config::CONFIG;
use homematch::db::Storage;
use homematch::router::{HomeMatchState, homematch_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.listen_addr,
        database_url = %cfg.database_url,
        storage_dir = %cfg.storage_dir.display(),
        public_base_url = %cfg.public_base_url,
        geocoder = %cfg.geocoder.base_url,
        loglevel = %cfg.loglevel,
    );
    if cfg.jwt_secret.is_empty() {
        warn!("jwt_secret is empty; every authenticated route will answer 401");
    }
    if cfg.service_key.is_empty() {
        warn!("service_key is empty; admin routes are disabled");
    }

    tokio::fs::create_dir_all(&cfg.storage_dir).await?;
    let storage = Storage::connect(&cfg.database_url).await?;

    let state = HomeMatchState::new(storage, Arc::new(cfg.clone()))?;
    let app = homematch_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
