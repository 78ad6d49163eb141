//! Server configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and a config file.
//! Priority: CLI > Environment > File > Defaults
//!
//! The result is validated once and then shared read-only as
//! `Arc<ServerConfig>` for the lifetime of the process.

mod defaults;
mod loading;
mod validation;

use devedge_build::BuildTarget;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::*;
pub use loading::{CONFIG_FILE, CliOverrides, ENV_PREFIX, FIELDS};

/// devedge configuration, loaded from devedge.config.json, env and CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    /// PEM private key for the TLS listener
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,

    /// PEM certificate chain for the TLS listener
    #[serde(default = "default_cert_path")]
    pub cert_path: PathBuf,

    /// Directory static requests are resolved against
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Document served when a request resolves to a directory
    #[serde(default = "default_document")]
    pub default_document: String,

    /// Interface both listeners bind to
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Cleartext HTTP/1.1 port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// TLS port (HTTP/2 via ALPN, HTTP/1.1 fallback)
    #[serde(default = "default_https_port")]
    pub https_port: u16,

    /// Files and directories whose changes trigger a rebuild
    #[serde(default = "default_watch")]
    pub watch: Vec<PathBuf>,

    /// Compilation units built on every run
    #[serde(default = "default_targets")]
    pub targets: Vec<BuildTarget>,

    /// Input path prefix counted as third-party modules in build stats
    #[serde(default = "default_vendor_marker")]
    pub vendor_marker: String,

    /// Upper bound for one upstream call made by the CORS relay
    #[serde(default = "default_relay_timeout_secs")]
    pub relay_timeout_secs: u64,

    /// Bundler executable
    #[serde(default = "default_bundler")]
    pub bundler: PathBuf,

    /// Repeated events for the same path inside this window are dropped (0 = off)
    #[serde(default)]
    pub debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            cert_path: default_cert_path(),
            root: default_root(),
            default_document: default_document(),
            host: default_host(),
            http_port: default_http_port(),
            https_port: default_https_port(),
            watch: default_watch(),
            targets: default_targets(),
            vendor_marker: default_vendor_marker(),
            relay_timeout_secs: default_relay_timeout_secs(),
            bundler: default_bundler(),
            debounce_ms: 0,
        }
    }
}

impl ServerConfig {
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
