//! Upload and merge handlers
//!
//! Thin adapters: decode the wire request, call the domain entry point,
//! translate its outcome into a wire response. No upload business rules
//! live here.

use std::io;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio_stream::StreamExt;
use tokio_util::io::StreamReader;
use tracing::{error, info};

use chunkstitch_domain::upload::UploadError;

use crate::{
    dto::upload::{ApiResponse, MergeRequest, UploadParams},
    AppState,
};

/// Handle one chunk upload
///
/// The chunk bytes arrive as the multipart/form-data field named `chunk`
/// and are streamed into the store without buffering the whole chunk.
#[utoipa::path(
    post,
    path = "/upload",
    params(UploadParams),
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a single `chunk` file field"),
    responses(
        (status = 200, description = "Chunk persisted to temporary storage", body = String),
        (status = 400, description = "Malformed chunk index, invalid file name or missing chunk field", body = ApiResponse),
        (status = 500, description = "Storage I/O failure", body = ApiResponse)
    ),
    tag = "upload"
)]
pub async fn upload_chunk_handler(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Response {
    let Ok(chunk_index) = params.chunk_index.parse::<u64>() else {
        return reject(StatusCode::BAD_REQUEST, "invalid chunk index");
    };

    // Find the `chunk` field; anything else in the form is ignored.
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("chunk") => break field,
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => {
                return reject(StatusCode::BAD_REQUEST, "failed to get file from request");
            }
        }
    };

    let reader = StreamReader::new(field.map(|part| part.map_err(io::Error::other)));
    tokio::pin!(reader);

    match state
        .store
        .ingest(&params.file_name, chunk_index, reader)
        .await
    {
        Ok(()) => {
            info!(artifact = %params.file_name, chunk_index, "Chunk uploaded");
            (StatusCode::OK, "Chunk uploaded successfully").into_response()
        }
        Err(err) => {
            error!(artifact = %params.file_name, chunk_index, error = %err, "Chunk upload failed");
            error_response(&err)
        }
    }
}

/// Handle a merge request for one artifact
#[utoipa::path(
    post,
    path = "/merge-chunks",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Chunks merged into the final artifact", body = ApiResponse),
        (status = 400, description = "Malformed body or missing chunk index", body = ApiResponse),
        (status = 500, description = "Storage I/O failure", body = ApiResponse)
    ),
    tag = "upload"
)]
pub async fn merge_chunks_handler(
    State(state): State<AppState>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return reject(StatusCode::BAD_REQUEST, "invalid request body");
    };
    let Ok(total_chunks) = u64::try_from(request.total_chunk) else {
        return reject(StatusCode::BAD_REQUEST, "total chunk count must be positive");
    };

    match state.engine.merge(&request.file_name, total_chunks).await {
        Ok(()) => {
            info!(artifact = %request.file_name, total_chunks, "Chunks merged");
            (
                StatusCode::OK,
                Json(ApiResponse {
                    status: StatusCode::OK.as_u16(),
                    message: "Chunks merged successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!(artifact = %request.file_name, total_chunks, error = %err, "Merge failed");
            error_response(&err)
        }
    }
}

/// Map a domain error onto its HTTP status classification
fn error_response(err: &UploadError) -> Response {
    let status = match err {
        UploadError::InvalidInput(_) | UploadError::MissingChunk { .. } => StatusCode::BAD_REQUEST,
        UploadError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    reject(status, err.to_string())
}

fn reject(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse {
            status: status.as_u16(),
            message: message.into(),
        }),
    )
        .into_response()
}
