//! # Chunkstitch Domain Layer
//!
//! This crate contains the pure business logic for the Chunkstitch upload
//! platform: accepting a large file as independently-uploaded chunks and
//! reassembling them, in index order, into one final artifact.
//!
//! - **ChunkKey**: typed identity of one chunk (artifact name + index)
//! - **ChunkStore**: writes incoming chunk streams into temporary storage
//! - **ReassemblyEngine**: concatenates chunks into the final artifact and
//!   reclaims temporary storage afterwards
//!
//! ## Architecture
//!
//! This layer has NO dependencies on HTTP concerns (routing, multipart
//! decoding, JSON encoding). The adapter layer feeds it an [`AsyncRead`]
//! per chunk and two plain calls: ingest and merge. Storage locations are
//! explicit configuration ([`StorageLayout`]) passed in at construction, so
//! tests can point each instance at isolated scratch directories.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chunkstitch_domain::upload::{ChunkStore, ReassemblyEngine, StorageLayout};
//!
//! # async fn example() -> chunkstitch_domain::upload::Result<()> {
//! let layout = StorageLayout::new("./temp", "./uploads");
//! let store = ChunkStore::new(layout.clone());
//! let engine = ReassemblyEngine::new(layout);
//!
//! store.ingest("report.pdf", 0, &b"first half"[..]).await?;
//! store.ingest("report.pdf", 1, &b"second half"[..]).await?;
//! engine.merge("report.pdf", 2).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`AsyncRead`]: tokio::io::AsyncRead

pub mod upload;

// Re-export commonly used types
pub use upload::{ChunkKey, ChunkStore, ReassemblyEngine, StorageLayout, UploadError};
