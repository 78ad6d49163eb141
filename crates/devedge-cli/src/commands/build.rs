//! One-shot build command.

use crate::cli::BuildArgs;
use crate::config::{CliOverrides, ServerConfig};
use crate::error::Result;
use crate::ui;
use devedge_build::BuildTrigger;
use std::time::Instant;

/// Execute the build command.
///
/// Builds every configured target once. A failed build is returned as an
/// error, which makes the process exit with status 1.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let config = ServerConfig::load(&CliOverrides::default(), args.config.as_deref())?;
    let cwd = std::env::current_dir()?;

    let mut orchestrator = super::orchestrator(&config, &cwd).await;

    let start = Instant::now();
    let stats = orchestrator.rebuild(&BuildTrigger::startup()).await?;

    ui::print_build_summary(&stats, start.elapsed());
    ui::success("Build complete");
    Ok(())
}
