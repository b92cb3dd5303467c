mod compose;
mod config;
mod errors;
mod layout;
mod models;
mod render;
mod routes;
mod sessions;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::sessions::locks::SessionLocks;
use crate::state::AppState;
use crate::store::FsAssetStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting stampsheet API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the session asset store
    let store = FsAssetStore::new(&config.data_dir);
    store.ensure_root().await?;
    info!("Asset store rooted at {}", config.data_dir.display());
    info!(
        "Grid sheet: {}x{}mm, page margin {}mm, cell margin {}mm",
        crate::layout::SHEET_WIDTH_MM,
        crate::layout::SHEET_HEIGHT_MM,
        config.page_margin_mm,
        config.cell_margin_mm
    );

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        config: config.clone(),
        sessions: SessionLocks::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
