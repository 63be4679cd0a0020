//! Upload domain module
//!
//! This module contains the core business logic for chunked uploads: how a
//! chunk is identified and stored, and how the chunks of one artifact are
//! merged back together and cleaned up.

mod error;
mod key;
mod layout;
mod merge;
mod store;

pub use error::{Result, UploadError};
pub use key::ChunkKey;
pub use layout::{StorageLayout, DEFAULT_TEMP_DIR, DEFAULT_UPLOAD_DIR};
pub use merge::ReassemblyEngine;
pub use store::ChunkStore;
