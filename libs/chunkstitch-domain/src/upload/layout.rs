//! Storage layout configuration
//!
//! Temporary and final storage are filesystem directories. They are explicit
//! configuration passed into both components at construction, never implicit
//! process-wide paths, so tests can point each instance at isolated scratch
//! locations.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::upload::key::ChunkKey;

/// Default temporary-storage directory when none is configured
pub const DEFAULT_TEMP_DIR: &str = "./temp";

/// Default final-storage directory when none is configured
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Locations of the temporary and final storage areas
///
/// The layout owns the path-mapping side of the storage contract:
///
/// - chunks live at `{temp_dir}/{artifactName}.part{chunkIndex}`
/// - finished artifacts live at `{final_dir}/{artifactName}`
/// - in-flight ingests write to a uniquely-named staging file in the temp
///   area and are renamed onto the canonical chunk name only once complete
#[derive(Debug, Clone)]
pub struct StorageLayout {
    temp_dir: PathBuf,
    final_dir: PathBuf,
}

impl StorageLayout {
    /// Create a layout rooted at the given temporary and final directories
    pub fn new(temp_dir: impl Into<PathBuf>, final_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            final_dir: final_dir.into(),
        }
    }

    /// The temporary-storage area holding not-yet-merged chunks
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// The final-storage area holding completed artifacts
    pub fn final_dir(&self) -> &Path {
        &self.final_dir
    }

    /// Canonical path of a chunk in temporary storage
    pub fn chunk_path(&self, key: &ChunkKey) -> PathBuf {
        self.temp_dir.join(key.file_name())
    }

    /// Fresh staging path for an in-flight ingest of `key`
    ///
    /// Each call yields a distinct name, so concurrent ingests of the same
    /// key never touch the same file. Staging names still match the
    /// `*.part*` convention and are therefore caught by the cleanup sweep if
    /// a failed ingest leaves one behind.
    pub fn staging_path(&self, key: &ChunkKey) -> PathBuf {
        self.temp_dir
            .join(format!("{}.{}.staging", key.file_name(), Uuid::now_v7()))
    }

    /// Path of the final artifact in final storage
    pub fn artifact_path(&self, artifact: &str) -> PathBuf {
        self.final_dir.join(artifact)
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(DEFAULT_TEMP_DIR, DEFAULT_UPLOAD_DIR)
    }
}
