//! Reassembly Engine - ordered concatenation of ingested chunks
//!
//! The engine is the consumer half of the pipeline: given an artifact name
//! and the caller-declared chunk count, it reads every chunk the store
//! wrote, appends them in strictly increasing index order into the final
//! artifact, deletes the consumed chunks and sweeps the temporary storage
//! area for strays.
//!
//! Chunk reads are fanned out across one task per index; their results fan
//! back in through a [`Sequencer`] that buffers out-of-order arrivals and
//! releases them in index order, so appends never need a lock at all.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::upload::error::{Result, UploadError};
use crate::upload::key::{validate_artifact_name, ChunkKey};
use crate::upload::layout::StorageLayout;

/// Capacity of the fan-in channel between reader tasks and the sequencer
const FAN_IN_CAPACITY: usize = 32;

/// One reader task's report: the chunk index plus its bytes or failure
type ChunkOutcome = (u64, Result<Vec<u8>>);

/// Service that merges ingested chunks into final artifacts
///
/// Merges for the *same* artifact name are serialized through an in-process
/// advisory lock, so two concurrent merge calls cannot race on the shared
/// chunk files; merges for different artifacts proceed independently. A
/// successful merge consumes its chunks - re-invoking it fails with
/// `MissingChunk` for index 0.
pub struct ReassemblyEngine {
    layout: StorageLayout,
    merge_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ReassemblyEngine {
    /// Create a new ReassemblyEngine over the given storage layout
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            merge_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// The storage layout this engine consumes from and publishes to
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Merge chunks `0..total_chunks` of `artifact` into the final artifact
    ///
    /// On success the final artifact's bytes equal the ordered concatenation
    /// of every chunk, the consumed chunk files are deleted, and the
    /// temporary storage area has been swept of strays. An artifact that
    /// already exists under this name is silently overwritten.
    ///
    /// # Errors
    ///
    /// - `UploadError::InvalidInput` if the name is malformed or
    ///   `total_chunks` is zero
    /// - `UploadError::MissingChunk` naming the lowest index that was never
    ///   ingested; bytes appended before the gap was found are NOT rolled
    ///   back, so the artifact must be discarded by the caller
    /// - `UploadError::StorageFailure` on any filesystem failure
    pub async fn merge(&self, artifact: &str, total_chunks: u64) -> Result<()> {
        validate_artifact_name(artifact)?;
        if total_chunks == 0 {
            return Err(UploadError::invalid_input(
                "total chunk count must be positive",
            ));
        }

        let lock = self.artifact_lock(artifact);
        let _guard = lock.lock().await;

        fs::create_dir_all(self.layout.final_dir())
            .await
            .map_err(|err| {
                UploadError::storage_failure(format!(
                    "failed to create final storage area '{}': {}",
                    self.layout.final_dir().display(),
                    err
                ))
            })?;

        let artifact_path = self.layout.artifact_path(artifact);
        let mut output = fs::File::create(&artifact_path).await.map_err(|err| {
            UploadError::storage_failure(format!(
                "failed to create final artifact '{}': {}",
                artifact_path.display(),
                err
            ))
        })?;

        // Fan out: one reader task per declared index.
        let (tx, mut rx) = mpsc::channel::<ChunkOutcome>(FAN_IN_CAPACITY);
        for index in 0..total_chunks {
            let tx = tx.clone();
            let path = self.layout.chunk_path(&ChunkKey::new(artifact, index)?);
            tokio::spawn(async move {
                let outcome = match fs::read(&path).await {
                    Ok(bytes) => Ok(bytes),
                    Err(err) if err.kind() == ErrorKind::NotFound => {
                        Err(UploadError::missing_chunk(index))
                    }
                    Err(err) => Err(UploadError::storage_failure(format!(
                        "failed to read chunk {}: {}",
                        index, err
                    ))),
                };
                // The receiver is gone if a lower index already failed.
                let _ = tx.send((index, outcome)).await;
            });
        }
        drop(tx);

        // Fan in: append strictly in index order, whatever order reads finish.
        let mut sequencer = Sequencer::new(total_chunks);
        let mut appended: u64 = 0;
        while !sequencer.is_complete() {
            let Some((index, outcome)) = rx.recv().await else {
                return Err(UploadError::storage_failure(
                    "chunk reader tasks ended before covering every index",
                ));
            };
            sequencer.accept(index, outcome);

            while let Some((index, outcome)) = sequencer.next_in_order() {
                let bytes = outcome?;
                output.write_all(&bytes).await.map_err(|err| {
                    UploadError::storage_failure(format!(
                        "failed to append chunk {} to final artifact: {}",
                        index, err
                    ))
                })?;
                appended += bytes.len() as u64;
                debug!(artifact, index, bytes = bytes.len(), "Appended chunk");
            }
        }

        output.flush().await.map_err(|err| {
            UploadError::storage_failure(format!("failed to flush final artifact: {}", err))
        })?;

        // Every chunk has been appended; consume the entries.
        for index in 0..total_chunks {
            let path = self.layout.chunk_path(&ChunkKey::new(artifact, index)?);
            fs::remove_file(&path).await.map_err(|err| {
                UploadError::storage_failure(format!(
                    "failed to delete consumed chunk {}: {}",
                    index, err
                ))
            })?;
        }

        self.sweep().await?;

        info!(
            artifact,
            total_chunks,
            bytes = appended,
            "Merged chunks into final artifact"
        );
        Ok(())
    }

    /// Remove every stray file matching the chunk-naming convention
    ///
    /// Covers chunks orphaned by abandoned uploads, partially-failed prior
    /// merges and leftover ingest staging files. A nonexistent temporary
    /// storage area counts as already clean. Best-effort: removal keeps
    /// going past individual failures and the first failure is reported at
    /// the end; removals already performed stand.
    pub async fn sweep(&self) -> Result<()> {
        let mut entries = match fs::read_dir(self.layout.temp_dir()).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(UploadError::storage_failure(format!(
                    "failed to list temporary storage area '{}': {}",
                    self.layout.temp_dir().display(),
                    err
                )))
            }
        };

        let mut removed: u64 = 0;
        let mut first_failure: Option<UploadError> = None;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    return Err(UploadError::storage_failure(format!(
                        "failed to list temporary storage area: {}",
                        err
                    )))
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.contains(".part") {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(file = %name, error = %err, "Failed to remove stray chunk file");
                    if first_failure.is_none() {
                        first_failure = Some(UploadError::storage_failure(format!(
                            "failed to remove stray chunk file '{}': {}",
                            name, err
                        )));
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => {
                debug!(removed, "Swept temporary storage area");
                Ok(())
            }
        }
    }

    /// Advisory lock guarding merges of one artifact name
    fn artifact_lock(&self, artifact: &str) -> Arc<Mutex<()>> {
        let mut locks = match self.merge_locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.entry(artifact.to_string()).or_default().clone()
    }
}

/// In-order release stage for out-of-order parallel chunk reads
///
/// Reader tasks finish in arbitrary order; the sequencer buffers each
/// `(index, outcome)` pair and hands outcomes back strictly by increasing
/// index. Because outcomes are resolved in index order, the first error it
/// releases is always the lowest problematic index.
struct Sequencer {
    next: u64,
    total: u64,
    pending: BTreeMap<u64, Result<Vec<u8>>>,
}

impl Sequencer {
    fn new(total: u64) -> Self {
        Self {
            next: 0,
            total,
            pending: BTreeMap::new(),
        }
    }

    /// Buffer one reader outcome
    fn accept(&mut self, index: u64, outcome: Result<Vec<u8>>) {
        self.pending.insert(index, outcome);
    }

    /// Release the next outcome, if the run of indices is unbroken so far
    fn next_in_order(&mut self) -> Option<(u64, Result<Vec<u8>>)> {
        let outcome = self.pending.remove(&self.next)?;
        let index = self.next;
        self.next += 1;
        Some((index, outcome))
    }

    /// Whether every index in `0..total` has been released
    fn is_complete(&self) -> bool {
        self.next >= self.total
    }
}
