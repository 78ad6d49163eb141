use clap::{Args, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::CliOverrides;

/// Available devedge subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server
    ///
    /// Builds once, then serves the project root over HTTP and HTTPS while
    /// rebuilding whenever a watched path changes.
    Serve(ServeArgs),

    /// Build all targets once and exit
    ///
    /// Exits with status 1 if any target fails.
    Build(BuildArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to config file (default: devedge.config.json if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to serve static files from
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Interface to bind both listeners to
    #[arg(long, value_name = "ADDR")]
    pub host: Option<IpAddr>,

    /// Cleartext HTTP/1.1 port
    #[arg(long, value_name = "PORT")]
    pub http_port: Option<u16>,

    /// TLS port (HTTP/2 with HTTP/1.1 fallback)
    #[arg(long, value_name = "PORT")]
    pub https_port: Option<u16>,

    /// File or directory to watch (repeatable, replaces the configured list)
    ///
    /// Examples:
    ///   devedge serve --watch src --watch package.json
    #[arg(short, long, value_name = "PATH")]
    pub watch: Vec<PathBuf>,
}

impl ServeArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            root: self.root.clone(),
            host: self.host,
            http_port: self.http_port,
            https_port: self.https_port,
            watch: (!self.watch.is_empty()).then(|| self.watch.clone()),
        }
    }
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Path to config file (default: devedge.config.json if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
