//! Stitch-Gate - Chunked Upload Gateway
//!
//! HTTP service for the Chunkstitch upload platform: accepts a large file as
//! independently-uploaded chunks and reassembles them, in index order, into
//! one final artifact on disk.

mod dto;
mod handlers;
mod routes;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use chunkstitch_domain::upload::{
    ChunkStore, ReassemblyEngine, StorageLayout, DEFAULT_TEMP_DIR, DEFAULT_UPLOAD_DIR,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChunkStore>,
    pub engine: Arc<ReassemblyEngine>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting Stitch-Gate upload service");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Storage locations (the only core configuration in scope)
    let temp_dir = std::env::var("STITCH_TEMP_DIR").unwrap_or_else(|_| {
        info!("STITCH_TEMP_DIR not set, using default: {}", DEFAULT_TEMP_DIR);
        DEFAULT_TEMP_DIR.to_string()
    });
    let upload_dir = std::env::var("STITCH_UPLOAD_DIR").unwrap_or_else(|_| {
        info!(
            "STITCH_UPLOAD_DIR not set, using default: {}",
            DEFAULT_UPLOAD_DIR
        );
        DEFAULT_UPLOAD_DIR.to_string()
    });

    info!(temp_dir = %temp_dir, upload_dir = %upload_dir, "Initializing storage layout");
    let layout = StorageLayout::new(temp_dir, upload_dir);

    // Create shared application state
    let state = AppState {
        store: Arc::new(ChunkStore::new(layout.clone())),
        engine: Arc::new(ReassemblyEngine::new(layout)),
    };

    // Build HTTP router
    let app = routes::create_router(state);

    // Get bind address from environment
    let host = std::env::var("GATE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("GATE_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!(addr = %addr, "Starting HTTP server");

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
