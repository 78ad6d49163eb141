//! Command-line interface definition.
//!
//! - `devedge serve` - dev server with rebuild on change
//! - `devedge build` - one-shot build

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, ServeArgs};

/// devedge - development edge server
#[derive(Parser, Debug)]
#[command(
    name = "devedge",
    version,
    about = "Development edge server with automatic rebuilds",
    long_about = "devedge serves a local application's static assets over HTTP/1.1 and HTTP/2,\n\
                  relays cross-origin JSON requests, and rebuilds the application bundle\n\
                  whenever watched sources change."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
