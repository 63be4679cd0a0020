//! API routes

pub mod upload;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::upload::{ApiResponse, MergeRequest},
    handlers, AppState,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload::upload_chunk_handler,
        handlers::upload::merge_chunks_handler,
        health_handler
    ),
    components(
        schemas(MergeRequest, ApiResponse)
    ),
    tags(
        (name = "upload", description = "Chunk upload and reassembly endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Stitch-Gate API",
        version = "0.1.0",
        description = "Chunked upload gateway for the Chunkstitch platform",
        contact(
            name = "Chunkstitch Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(upload::routes())
        .route("/health", axum::routing::get(health_handler))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}
