//! File management for Stash.
//!
//! - File records and their repository
//! - Upload, access-checked reads, rename and delete
//! - Sharded media storage with UUID names

mod metadata;
mod service;
mod storage;

pub use metadata::{FileRepository, NewFile, StoredFile};
pub use service::{FileService, UploadRequest};
pub use storage::FileStorage;

/// Maximum length of a file's display name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Default maximum payload size (100MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
