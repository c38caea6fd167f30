//! Versioned artifact history for Garland.
//!
//! A minimal version-control model specialized for binary blobs: an
//! append-only sequence of immutable versions, a mutable HEAD pointer,
//! and a denormalized copy of the active version at a well-known key.
//!
//! # Architecture
//!
//! - **Versions** are written once under `history/` with a
//!   timestamp-derived filename and never touched again. There is no
//!   garbage collection; history only grows.
//! - **HEAD** names the active version. Reads fall back to the newest
//!   history entry when the key is absent.
//! - **The active artifact** mirrors the HEAD version's bytes at
//!   `current_tree.png` so consumers need not resolve HEAD first.
//! - **Rollback/restore** move HEAD relative to the newest-first history
//!   ordering, clamping out-of-range requests to the nearest end.
//!
//! Everything is built on the [`BlobStore`](garland_blob::BlobStore)
//! capability set and is agnostic to which backend is in use.
//!
//! # Modules
//!
//! - [`error`] — Error types for history operations
//! - [`version`] — The validated [`VersionName`] filename type
//! - [`store`] — The [`HistoryStore`] itself and the key layout

pub mod error;
pub mod store;
pub mod version;

pub use error::{HistoryError, HistoryResult};
pub use store::{HistoryStore, ACTIVE_KEY, HEAD_KEY, HISTORY_PREFIX};
pub use version::VersionName;
