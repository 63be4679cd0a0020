//! Domain errors for upload operations
//!
//! This module defines all possible errors that can occur during chunk
//! ingestion, reassembly and cleanup. These are domain-level errors that
//! abstract away filesystem details.

use thiserror::Error;

/// Errors that can occur during chunk ingestion and reassembly
///
/// These errors represent business-level failures and are independent of the
/// storage implementation (no `std::io::Error` leaks through the public API).
#[derive(Error, Debug)]
pub enum UploadError {
    /// The caller supplied a malformed artifact name, index or chunk count
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A chunk required by the declared total was never ingested
    #[error("Chunk {index} does not exist")]
    MissingChunk { index: u64 },

    /// An I/O operation on temporary or final storage failed
    #[error("Storage operation failed: {0}")]
    StorageFailure(String),
}

impl UploadError {
    /// Create an invalid input error with a message
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a missing chunk error for the given index
    pub fn missing_chunk(index: u64) -> Self {
        Self::MissingChunk { index }
    }

    /// Create a storage failure error with a message
    pub fn storage_failure(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }
}

/// Result type alias for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let err = UploadError::invalid_input("artifact name cannot be empty");
        assert!(matches!(err, UploadError::InvalidInput(_)));
        assert_eq!(
            err.to_string(),
            "Invalid input: artifact name cannot be empty"
        );
    }

    #[test]
    fn test_missing_chunk_error() {
        let err = UploadError::missing_chunk(7);
        assert!(matches!(err, UploadError::MissingChunk { index: 7 }));
        assert_eq!(err.to_string(), "Chunk 7 does not exist");
    }

    #[test]
    fn test_storage_failure_error() {
        let err = UploadError::storage_failure("disk full");
        assert!(matches!(err, UploadError::StorageFailure(_)));
        assert_eq!(err.to_string(), "Storage operation failed: disk full");
    }
}
