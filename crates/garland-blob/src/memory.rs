use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. All blobs are held in memory behind
/// a `RwLock`; data is lost when the store is dropped.
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// The content type recorded for `key`, if present.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(key)
            .map(|(_, ct)| ct.clone())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> BlobResult<()> {
        let mut map = self.blobs.write().expect("lock poisoned");
        map.insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| BlobError::not_found(key))
    }

    async fn list(&self, prefix: &str) -> BlobResult<Vec<String>> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn copy(&self, src: &str, dst: &str) -> BlobResult<()> {
        let mut map = self.blobs.write().expect("lock poisoned");
        let entry = map
            .get(src)
            .cloned()
            .ok_or_else(|| BlobError::not_found(src))?;
        map.insert(dst.to_string(), entry);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let store = MemoryBlobStore::new();
        store
            .put("k", Bytes::from_static(b"data"), "image/png")
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_ref(), b"data");
        assert_eq!(store.content_type("k").unwrap(), "image/png");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn put_overwrites_existing() {
        let store = MemoryBlobStore::new();
        store
            .put("k", Bytes::from_static(b"old"), "image/png")
            .await
            .unwrap();
        store
            .put("k", Bytes::from_static(b"new"), "image/png")
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_ref(), b"new");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_returns_sorted_matches() {
        let store = MemoryBlobStore::new();
        store
            .put("history/tree_b.png", Bytes::from_static(b"b"), "image/png")
            .await
            .unwrap();
        store
            .put("history/tree_a.png", Bytes::from_static(b"a"), "image/png")
            .await
            .unwrap();
        store
            .put("HEAD", Bytes::from_static(b"x"), "text/plain")
            .await
            .unwrap();

        let keys = store.list("history/tree_").await.unwrap();
        assert_eq!(keys, vec!["history/tree_a.png", "history/tree_b.png"]);
    }

    #[tokio::test]
    async fn list_zero_matches_is_empty_not_error() {
        let store = MemoryBlobStore::new();
        assert!(store.list("history/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn copy_preserves_bytes_and_content_type() {
        let store = MemoryBlobStore::new();
        store
            .put("src", Bytes::from_static(b"payload"), "image/png")
            .await
            .unwrap();
        store.copy("src", "dst").await.unwrap();
        assert_eq!(store.get("dst").await.unwrap().as_ref(), b"payload");
        assert_eq!(store.content_type("dst").unwrap(), "image/png");
    }

    #[tokio::test]
    async fn copy_missing_source_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.copy("ghost", "dst").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound { key } if key == "ghost"));
    }

    #[tokio::test]
    async fn concurrent_access_is_safe() {
        use std::sync::Arc;

        let store = Arc::new(MemoryBlobStore::new());
        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = format!("blob-{i}");
                store
                    .put(&key, Bytes::from(vec![i]), "application/octet-stream")
                    .await
                    .unwrap();
                assert_eq!(store.get(&key).await.unwrap().as_ref(), &[i]);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.len(), 8);
    }
}
