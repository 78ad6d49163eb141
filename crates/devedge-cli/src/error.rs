//! Error handling for the devedge CLI.
//!
//! `CliError` is the top-level error returned by commands. Domain errors
//! (`ConfigError`, `ServerError`, and the bundler's `BuildError`) convert into
//! it automatically via `#[from]`.
//!
//! Only startup problems surface as errors. Once the server runs, build
//! failures, watch failures, missing files and relay failures are logged and
//! handled in place.

mod report;

pub use report::{build_error_to_miette, cli_error_to_miette};

use devedge_build::BuildError;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build run failed
    #[error("{0}")]
    Build(#[from] BuildError),

    /// Listener startup errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a devedge.config.json file or specify --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Listener startup errors. Both are fatal.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A listening socket could not be bound
    #[error("Failed to bind {addr}: {source}\n\nHint: Another process may already use this port")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Key pair missing or unusable
    #[error("TLS setup failed: {0}\n\nHint: Check keyPath and certPath point to PEM files")]
    Tls(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
