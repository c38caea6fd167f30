//! Local filesystem blob backend.
//!
//! Keys map to paths under a root data directory. Writes go to a
//! temporary sibling file first and are renamed into place, so readers
//! never observe a partially written blob.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Blob store rooted at a local data directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(BlobError::unavailable)?;
        Ok(Self { root })
    }

    /// The root data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its on-disk path.
    ///
    /// Rejects absolute keys and `..` segments; such keys cannot name a
    /// blob in this store.
    fn resolve(&self, key: &str) -> BlobResult<PathBuf> {
        if key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|seg| seg.is_empty() || seg == "..")
        {
            return Err(BlobError::not_found(key));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> BlobResult<()> {
        let path = self.resolve(key)?;
        let parent = path
            .parent()
            .ok_or_else(|| BlobError::not_found(key))?
            .to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(BlobError::unavailable)?;

        // Write-then-rename: the rename is atomic on the same filesystem,
        // so a concurrent get sees the old bytes or the new bytes.
        let file_name = path
            .file_name()
            .ok_or_else(|| BlobError::not_found(key))?
            .to_string_lossy()
            .into_owned();
        let tmp = parent.join(format!(
            ".{file_name}.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        ));

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(BlobError::unavailable)?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(BlobError::unavailable(err));
        }
        debug!(key, size = bytes.len(), "blob written");
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(BlobError::not_found(key)),
            Err(err) => Err(BlobError::unavailable(err)),
        }
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        // A prefix is a directory part plus a file-name stem; keys in this
        // store form a flat namespace below each directory.
        let (dir_part, stem) = match prefix.rsplit_once('/') {
            Some((dir, stem)) => (dir, stem),
            None => ("", prefix),
        };
        let dir = if dir_part.is_empty() {
            self.root.clone()
        } else {
            match self.resolve(dir_part) {
                Ok(path) => path,
                Err(_) => return Ok(Vec::new()),
            }
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(BlobError::unavailable(err)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(BlobError::unavailable)? {
            let file_type = entry.file_type().await.map_err(BlobError::unavailable)?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".tmp") || !name.starts_with(stem) {
                continue;
            }
            if dir_part.is_empty() {
                keys.push(name);
            } else {
                keys.push(format!("{dir_part}/{name}"));
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn copy(&self, src: &str, dst: &str) -> BlobResult<()> {
        let src_path = self.resolve(src)?;
        let dst_path = self.resolve(dst)?;
        if let Some(parent) = dst_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BlobError::unavailable)?;
        }
        match tokio::fs::copy(&src_path, &dst_path).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(BlobError::not_found(src)),
            Err(err) => Err(BlobError::unavailable(err)),
        }
    }
}
