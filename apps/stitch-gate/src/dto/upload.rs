//! DTOs for upload endpoints
//!
//! Field names follow the wire contract clients already speak:
//! `fileName`/`chunkIndex` query parameters on upload and a
//! `{"fileName", "totalChunk"}` JSON body on merge.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters identifying one uploaded chunk
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    /// Name of the artifact this chunk belongs to
    pub file_name: String,
    /// Zero-based chunk position, sent as a decimal string
    pub chunk_index: String,
}

/// Request body for the merge endpoint
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Name of the artifact to reassemble
    #[schema(example = "video.mp4")]
    pub file_name: String,
    /// Declared number of chunks, indices 0..totalChunk-1
    #[schema(example = 12)]
    pub total_chunk: i64,
}

/// Uniform status/message body used for merge success and all errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse {
    /// HTTP status code, repeated in the body
    #[schema(example = 200)]
    pub status: u16,
    /// Human-readable outcome description
    #[schema(example = "Chunks merged successfully")]
    pub message: String,
}
