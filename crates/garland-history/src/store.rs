//! The history store: append-only versions plus a movable HEAD.
//!
//! All well-known key names live here. Everything is expressed through
//! the [`BlobStore`] capability set, so the same logic runs against the
//! local filesystem, the remote gateway, or the in-memory test backend.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use garland_blob::BlobStore;

use crate::error::{HistoryError, HistoryResult};
use crate::version::VersionName;

/// Well-known key holding the active version's filename.
pub const HEAD_KEY: &str = "HEAD";
/// Well-known key holding the denormalized copy of the active version.
pub const ACTIVE_KEY: &str = "current_tree.png";
/// Namespace under which immutable versions are stored.
pub const HISTORY_PREFIX: &str = "history/";

const PNG_CONTENT_TYPE: &str = "image/png";
const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Append-only version history with a movable HEAD pointer.
///
/// Versions are never mutated or deleted. HEAD and the active-artifact
/// key move on every commit, rollback, and restore; "last write to HEAD
/// wins" is the consistency model — there is no cross-key transaction in
/// either backend.
pub struct HistoryStore {
    store: Arc<dyn BlobStore>,
}

impl HistoryStore {
    /// Build a history store over the given backend.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// The underlying blob backend.
    pub fn backend(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    fn history_key(name: &VersionName) -> String {
        format!("{HISTORY_PREFIX}{name}")
    }

    /// The version HEAD currently points to.
    ///
    /// Falls back to the newest history entry when the HEAD key is absent
    /// or holds something that is not a version name; `None` only when
    /// history is empty. Mere absence is never an error.
    pub async fn head(&self) -> HistoryResult<Option<VersionName>> {
        match self.store.get(HEAD_KEY).await {
            Ok(bytes) => {
                let raw = String::from_utf8_lossy(&bytes);
                let trimmed = raw.trim();
                if let Some(name) = VersionName::parse(trimmed) {
                    return Ok(Some(name));
                }
                warn!(head = trimmed, "HEAD does not name a version, using newest entry");
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }
        Ok(self.list_history().await?.into_iter().next())
    }

    /// Point HEAD at `name`.
    ///
    /// Idempotent. Does not verify that `name` exists; [`set_active`]
    /// is the operation that enforces the HEAD-points-at-real-version
    /// invariant.
    ///
    /// [`set_active`]: Self::set_active
    pub async fn update_head(&self, name: &VersionName) -> HistoryResult<()> {
        self.store
            .put(
                HEAD_KEY,
                Bytes::from(name.as_str().to_owned()),
                TEXT_CONTENT_TYPE,
            )
            .await?;
        Ok(())
    }

    /// Append `bytes` to history under a freshly minted name.
    ///
    /// A pure append: neither HEAD nor the active artifact moves.
    pub async fn save_to_history(&self, bytes: Bytes) -> HistoryResult<VersionName> {
        let name = VersionName::mint(Utc::now());
        self.store
            .put(&Self::history_key(&name), bytes, PNG_CONTENT_TYPE)
            .await?;
        info!(version = %name, "version appended to history");
        Ok(name)
    }

    /// Make `name` the active version: copy its bytes to the active key,
    /// then move HEAD.
    ///
    /// The copy and the HEAD write are two independent backend calls. A
    /// crash between them leaves the active artifact updated while HEAD
    /// is stale; `startup_restore` re-synchronizes the pair at boot.
    pub async fn set_active(&self, name: &VersionName) -> HistoryResult<()> {
        match self.store.copy(&Self::history_key(name), ACTIVE_KEY).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                return Err(HistoryError::VersionNotFound {
                    name: name.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        }
        self.update_head(name).await?;
        info!(version = %name, "active version switched");
        Ok(())
    }

    /// All committed versions, newest first.
    ///
    /// Derived by listing the history namespace; an empty history is an
    /// empty vec, never an error.
    pub async fn list_history(&self) -> HistoryResult<Vec<VersionName>> {
        let prefix = format!("{HISTORY_PREFIX}{}", VersionName::PREFIX);
        let keys = self.store.list(&prefix).await?;
        let mut names: Vec<VersionName> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(HISTORY_PREFIX))
            .filter_map(VersionName::parse)
            .collect();
        // Descending: embedded zero-padded timestamps make this newest-first.
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Move the active version `steps` entries relative to HEAD.
    ///
    /// Positive steps move toward older entries, negative toward newer.
    /// Requests past either end clamp to the oldest or newest entry
    /// instead of failing; when HEAD is unset or names an unknown entry
    /// the current position is taken to be the newest.
    pub async fn rollback(&self, steps: i64) -> HistoryResult<VersionName> {
        let history = self.list_history().await?;
        if history.is_empty() {
            return Err(HistoryError::EmptyHistory);
        }

        let current_index = match self.head().await? {
            Some(head) => history.iter().position(|n| *n == head).unwrap_or(0),
            None => 0,
        };

        let last = history.len() as i64 - 1;
        let target = (current_index as i64).saturating_add(steps).clamp(0, last) as usize;
        let name = history[target].clone();
        self.set_active(&name).await?;
        Ok(name)
    }

    /// Jump directly to a known version filename.
    pub async fn restore(&self, filename: &str) -> HistoryResult<VersionName> {
        let name = VersionName::parse(filename).ok_or_else(|| HistoryError::VersionNotFound {
            name: filename.to_string(),
        })?;
        self.set_active(&name).await?;
        Ok(name)
    }

    /// Bytes of the active artifact.
    pub async fn active_bytes(&self) -> HistoryResult<Bytes> {
        Ok(self.store.get(ACTIVE_KEY).await?)
    }

    /// Bytes of a specific committed version.
    pub async fn version_bytes(&self, name: &VersionName) -> HistoryResult<Bytes> {
        match self.store.get(&Self::history_key(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.is_not_found() => Err(HistoryError::VersionNotFound {
                name: name.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Re-synchronize the active artifact with HEAD at process start.
    ///
    /// Heals the window left by a crash between `set_active`'s copy and
    /// HEAD write, and any external tampering with the active key. A
    /// HEAD pointing at a missing version is logged and skipped, never
    /// fatal.
    pub async fn startup_restore(&self) -> HistoryResult<Option<VersionName>> {
        let Some(head) = self.head().await? else {
            info!("no history yet, nothing to restore");
            return Ok(None);
        };
        match self.set_active(&head).await {
            Ok(()) => {
                info!(version = %head, "state restored from HEAD");
                Ok(Some(head))
            }
            Err(HistoryError::VersionNotFound { name }) => {
                warn!(version = name, "HEAD names a missing version, skipping restore");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
