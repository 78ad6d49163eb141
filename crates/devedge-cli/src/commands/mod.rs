//! Command implementations.
//!
//! - [`serve`] - Development server with rebuild on change
//! - [`build`] - One-shot build
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod build;
pub mod serve;

pub use build::execute as build_execute;
pub use serve::execute as serve_execute;

use crate::config::ServerConfig;
use crate::ui;
use devedge_build::{BuildOrchestrator, EsbuildBundler};
use std::path::Path;

/// Create the process-wide bundler and the orchestrator that owns it.
async fn orchestrator(config: &ServerConfig, cwd: &Path) -> BuildOrchestrator<EsbuildBundler> {
    let mut bundler = EsbuildBundler::new(&config.bundler, cwd);
    match bundler.probe().await {
        Ok(version) => tracing::debug!("Using {} {}", config.bundler.display(), version),
        Err(e) => ui::warning(&format!("Bundler not available: {}", e)),
    }

    BuildOrchestrator::new(
        bundler,
        config.targets.clone(),
        config.vendor_marker.clone(),
    )
}
