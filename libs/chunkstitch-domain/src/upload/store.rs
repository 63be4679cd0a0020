//! Chunk Store - chunk ingestion into temporary storage
//!
//! The store is the producer half of the pipeline: it receives one chunk
//! stream at a time, addressed by (artifact name, chunk index), and persists
//! it under the deterministic chunk name the Reassembly Engine will later
//! consume.

use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::upload::error::{Result, UploadError};
use crate::upload::key::ChunkKey;
use crate::upload::layout::StorageLayout;

/// Size of the bounded intermediate copy buffer (4 MiB)
///
/// Chunks of arbitrary length stream through this buffer; a chunk is never
/// required to fit in memory.
const COPY_BUF_LEN: usize = 4 * 1024 * 1024;

/// Service that writes incoming chunks into the temporary storage area
///
/// Each ingest call is independent and safe to run concurrently with other
/// ingest calls for the same or different artifacts: every call writes to a
/// uniquely-named staging file and atomically renames it onto the canonical
/// `{artifactName}.part{chunkIndex}` name once the full stream has been
/// copied. A reader can therefore never observe a half-written chunk under
/// the canonical name.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    layout: StorageLayout,
}

impl ChunkStore {
    /// Create a new ChunkStore over the given storage layout
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// The storage layout this store writes into
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Ingest one chunk
    ///
    /// Streams `reader` to durable temporary storage under the key
    /// (`artifact`, `index`). Re-ingesting an existing key overwrites the
    /// prior content; only the latest ingested content is used by a merge.
    ///
    /// # Errors
    ///
    /// - `UploadError::InvalidInput` if the artifact name is malformed
    ///   (nothing is written in that case)
    /// - `UploadError::StorageFailure` if the stream or the filesystem fails
    ///   mid-copy; the canonical chunk name is left untouched
    pub async fn ingest(
        &self,
        artifact: &str,
        index: u64,
        reader: impl AsyncRead + Unpin,
    ) -> Result<()> {
        let key = ChunkKey::new(artifact, index)?;

        // Idempotent creation of the temporary storage area.
        fs::create_dir_all(self.layout.temp_dir()).await.map_err(|err| {
            UploadError::storage_failure(format!(
                "failed to create temporary storage area '{}': {}",
                self.layout.temp_dir().display(),
                err
            ))
        })?;

        let staging = self.layout.staging_path(&key);
        let copied = match self.copy_to_staging(&staging, reader).await {
            Ok(bytes) => bytes,
            Err(err) => {
                // Best effort: a leftover staging file is also caught by the
                // next cleanup sweep.
                let _ = fs::remove_file(&staging).await;
                return Err(err);
            }
        };

        let canonical = self.layout.chunk_path(&key);
        if let Err(err) = fs::rename(&staging, &canonical).await {
            let _ = fs::remove_file(&staging).await;
            return Err(UploadError::storage_failure(format!(
                "failed to publish chunk '{}': {}",
                key, err
            )));
        }

        info!(chunk = %key, bytes = copied, "Ingested chunk");
        Ok(())
    }

    /// Copy the full stream into `staging` through the bounded buffer
    async fn copy_to_staging(
        &self,
        staging: &std::path::Path,
        mut reader: impl AsyncRead + Unpin,
    ) -> Result<u64> {
        let mut file = fs::File::create(staging).await.map_err(|err| {
            UploadError::storage_failure(format!(
                "failed to create staging file '{}': {}",
                staging.display(),
                err
            ))
        })?;

        let mut buf = vec![0u8; COPY_BUF_LEN];
        let mut copied: u64 = 0;
        loop {
            let n = reader.read(&mut buf).await.map_err(|err| {
                UploadError::storage_failure(format!("failed to read chunk stream: {}", err))
            })?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await.map_err(|err| {
                UploadError::storage_failure(format!(
                    "failed to write chunk to temporary storage: {}",
                    err
                ))
            })?;
            copied += n as u64;
        }

        file.flush().await.map_err(|err| {
            UploadError::storage_failure(format!("failed to flush chunk data: {}", err))
        })?;

        debug!(path = %staging.display(), bytes = copied, "Staged chunk stream");
        Ok(copied)
    }
}
