//! Upload routes

use axum::{routing::post, Router};

use crate::{
    handlers::upload::{merge_chunks_handler, upload_chunk_handler},
    AppState,
};

/// Create upload routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_chunk_handler))
        .route("/merge-chunks", post(merge_chunks_handler))
}
