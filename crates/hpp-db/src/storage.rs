//! # Photo Storage
//!
//! Where uploaded product photos are kept.
//!
//! ```text
//! ┌────────────────────┐  upload(path, bytes)   ┌──────────────────────────────┐
//! │  workbench action  │ ─────────────────────► │ LocalPhotoStorage            │
//! │  (add photo)       │ ◄───────────────────── │  {root}/{path}               │
//! └────────────────────┘   public URL           │  {base_url}/product-images/  │
//!                                               │            {path}            │
//!                                               └──────────────────────────────┘
//! ```
//!
//! Paths are relative to the bucket, e.g. `products/p1-1700000000000-k3j9x.jpg`
//! (see [`hpp_core::photos::photo_storage_path`]). The public URL embeds the
//! bucket name so the path can be recovered with
//! [`hpp_core::photos::storage_path_from_url`].

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use hpp_core::photos::PHOTO_BUCKET;

use crate::error::{DbError, DbResult};

/// Blob store for product photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores `bytes` at `path` and returns the public URL.
    async fn upload(&self, path: &str, bytes: &[u8]) -> DbResult<String>;

    /// Removes the file at `path`. Removing a missing file succeeds.
    async fn delete(&self, path: &str) -> DbResult<()>;

    /// Public URL for `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Photo storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalPhotoStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalPhotoStorage {
    /// `root` is the bucket directory; `base_url` is what URLs are served
    /// under (without the bucket name).
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        LocalPhotoStorage {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a bucket-relative path, refusing anything that could leave
    /// the bucket directory.
    fn resolve(&self, path: &str) -> DbResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if path.is_empty() || escapes {
            return Err(DbError::Storage(format!("invalid photo path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn upload(&self, path: &str, bytes: &[u8]) -> DbResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        debug!(path = %path, size = bytes.len(), "Stored photo");
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> DbResult<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path = %path, "Removed photo");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            PHOTO_BUCKET,
            path
        )
    }
}
