use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobResult;

/// Uniform read/write/list/copy primitive over named keys.
///
/// All implementations must satisfy these invariants:
/// - Keys are `/`-separated relative paths; the store never interprets
///   blob contents.
/// - `put` overwrites an existing blob. A concurrent `get` observes
///   either the old bytes or the new bytes, never a partial write.
/// - `list` returns an empty vec when nothing matches; zero matches is
///   not an error.
/// - `copy` moves bytes inside the backend without routing them through
///   the caller where the backend supports it.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, overwriting any existing blob.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> BlobResult<()>;

    /// Read the blob stored at `key`.
    ///
    /// Fails with [`BlobError::NotFound`] when the key is absent.
    async fn get(&self, key: &str) -> BlobResult<Bytes>;

    /// List all keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>>;

    /// Copy the blob at `src` to `dst`, overwriting `dst` if present.
    ///
    /// Fails with [`BlobError::NotFound`] when `src` is absent.
    async fn copy(&self, src: &str, dst: &str) -> BlobResult<()>;
}
