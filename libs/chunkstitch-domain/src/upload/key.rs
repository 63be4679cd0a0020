use serde::{Deserialize, Serialize};
use std::fmt;

use crate::upload::error::{Result, UploadError};

/// Identity of a single chunk: the pair (artifact name, chunk index)
///
/// ChunkKey is the unit the whole system is addressed by. Ingestion creates
/// one temporary-storage entry per key; reassembly consumes the keys
/// `(name, 0) .. (name, total - 1)` in order. The key also fixes the on-disk
/// naming convention, `{artifactName}.part{chunkIndex}`, which other tooling
/// may rely on for inspection or recovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    artifact: String,
    index: u64,
}

impl ChunkKey {
    /// Create a validated ChunkKey
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidInput` if the artifact name is empty or
    /// would escape the storage directory it is joined onto (path separators
    /// or `..` components).
    pub fn new(artifact: impl Into<String>, index: u64) -> Result<Self> {
        let artifact = artifact.into();
        validate_artifact_name(&artifact)?;
        Ok(Self { artifact, index })
    }

    /// The artifact this chunk belongs to
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// The position of this chunk within the artifact
    pub fn index(&self) -> u64 {
        self.index
    }

    /// File name of this chunk inside the temporary storage area
    pub fn file_name(&self) -> String {
        format!("{}.part{}", self.artifact, self.index)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Validate an artifact name before it is joined onto a storage directory
///
/// Names are used verbatim as file names in both storage areas, so anything
/// that could traverse out of them is rejected up front.
pub fn validate_artifact_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(UploadError::invalid_input("artifact name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(UploadError::invalid_input(format!(
            "artifact name '{}' must not contain path separators",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(UploadError::invalid_input(format!(
            "artifact name '{}' is not a valid file name",
            name
        )));
    }
    Ok(())
}
