//! HTTP/WebSocket transport for Garland.
//!
//! Exposes the version pipeline and the history store's admin controls
//! over HTTP, and fans change events out to WebSocket clients. Domain
//! errors are translated into structured JSON responses; no request
//! failure terminates the process.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use config::{GeneratorSettings, ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::GarlandServer;
pub use state::{build_backend, AppState};
