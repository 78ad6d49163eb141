//! devedge - development edge server.
//!
//! One process that serves a local application's static assets over
//! HTTP/1.1 and HTTP/2, relays cross-origin JSON requests, and rebuilds the
//! application bundle when watched sources change.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line definition (clap)
//! - [`config`] - Layered configuration (defaults, file, env, CLI)
//! - [`dev`] - Resolver, transfer layer, relay, watcher and listeners
//! - [`commands`] - `serve` and `build`
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status lines
//!
//! Build orchestration lives in the `devedge-build` crate.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use config::ServerConfig;
pub use error::{CliError, ConfigError, Result, ServerError};
