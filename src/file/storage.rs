//! Media storage for uploaded payloads.
//!
//! Payloads get a UUID-based name and are sharded by the first two
//! characters of that name:
//!
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012.png
//! └── cd/
//!     └── cd90ab12-3456-7890-abcd-ef1234567890.bin
//! ```
//!
//! The same layout is served under the media URL prefix, so a payload's
//! URL is `{prefix}/{shard}/{stored_name}`.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::Result;

/// Filesystem-backed payload storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
    url_prefix: String,
}

impl FileStorage {
    /// Create storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_path,
            url_prefix,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save `content` under a fresh stored name derived from `original_name`.
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let stored_name = Self::generate_stored_name(original_name);
        self.save_with_name(content, &stored_name).await?;
        Ok(stored_name)
    }

    pub async fn save_with_name(&self, content: &[u8], stored_name: &str) -> Result<()> {
        let path = self.path_for(stored_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        Ok(())
    }

    /// Remove a payload. Returns `false` if it was already gone.
    pub async fn delete(&self, stored_name: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(stored_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, stored_name: &str) -> bool {
        self.path_for(stored_name).exists()
    }

    /// `{base_path}/{shard}/{stored_name}`
    pub fn path_for(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(shard(stored_name)).join(stored_name)
    }

    /// Public URL of a stored payload.
    pub fn url_for(&self, stored_name: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, shard(stored_name), stored_name)
    }

    /// A new `{uuid}.{ext}` name; the extension defaults to `bin`.
    pub fn generate_stored_name(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");
        format!("{}.{ext}", Uuid::new_v4())
    }
}

fn shard(stored_name: &str) -> &str {
    stored_name.get(..2).unwrap_or(stored_name)
}
