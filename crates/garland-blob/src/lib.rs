//! Blob storage backends for Garland.
//!
//! Every persisted artifact -- history versions, the HEAD pointer, the
//! denormalized active image -- is an opaque blob under a string key.
//! This crate defines the [`BlobStore`] capability set and its variants;
//! everything above it is backend-agnostic.
//!
//! # Backends
//!
//! - [`FsBlobStore`] -- keys as paths under a local data directory
//! - [`HttpBlobStore`] -- remote object-store gateway over JSON/HTTP
//! - [`MemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. The backend is selected once at startup; no storage branching in
//!    business logic.
//! 2. `put` is overwrite-on-exists and atomic from the reader's view.
//! 3. `list` with zero matches returns an empty vec, never an error.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod http;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use http::{HttpBlobConfig, HttpBlobStore};
pub use memory::MemoryBlobStore;
pub use traits::BlobStore;
