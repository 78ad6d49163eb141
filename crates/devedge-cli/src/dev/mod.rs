//! Development server module.
//!
//! Provides the long-running half of devedge:
//! - Static files from the project root, optionally brotli-compressed
//! - A CORS relay for JSON APIs
//! - Cleartext HTTP/1.1 and TLS (HTTP/2 via ALPN) listeners
//! - File watching that feeds the build orchestrator

pub mod client_ip;
pub mod mime;
pub mod relay;
pub mod request;
pub mod resolver;
pub mod server;
pub mod tls;
pub mod transfer;
pub mod watcher;

// Re-exports
pub use request::RequestContext;
pub use resolver::{ResolvedFile, resolve};
pub use server::{AppState, DevServer, SharedState, router};
pub use watcher::{ChangeWatcher, FileChange, WatchReport};
