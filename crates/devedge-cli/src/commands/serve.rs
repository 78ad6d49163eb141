//! Development server command.
//!
//! Lifecycle:
//! - Load configuration and start the build task
//! - Attach the watcher
//! - Bind both listeners, then request the initial build
//! - Forward changes to the build task until Ctrl+C

use crate::cli::ServeArgs;
use crate::config::ServerConfig;
use crate::dev::{ChangeWatcher, DevServer};
use crate::error::{CliError, Result};
use crate::ui;
use devedge_build::BuildTrigger;
use std::sync::Arc;
use tokio::signal;

/// Execute the serve command.
///
/// # Errors
///
/// Returns errors for invalid configuration, unusable TLS material, ports
/// that cannot be bound, and a watcher that cannot be created. Build failures
/// are logged and never end the command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    ui::info("Starting development server...");

    let config = Arc::new(ServerConfig::load(&args.overrides(), args.config.as_deref())?);
    let cwd = std::env::current_dir()?;
    ui::info(&format!("Serving files from: {}", config.root.display()));

    let build = super::orchestrator(&config, &cwd).await.spawn();

    let (watcher, mut change_rx) = ChangeWatcher::new(&config.watch, config.debounce())?;
    let report = watcher.report();
    tracing::info!("Monitoring: {:?}", report.attached);
    if !report.failed.is_empty() {
        ui::warning(&format!("{} watch path(s) skipped", report.failed.len()));
    }

    let server = DevServer::bind(Arc::clone(&config)).await?;
    ui::success(&format!("HTTP server listening: http://{}", server.http_addr()?));
    ui::success(&format!("HTTP2 server listening: https://{}", server.https_addr()?));
    let mut server_handle = tokio::spawn(server.run());

    build.trigger(BuildTrigger::startup());
    ui::info("Press Ctrl+C to stop");

    let result = loop {
        tokio::select! {
            Some(change) = change_rx.recv() => {
                tracing::debug!("Change detected: {:?}", change);
                if !build.trigger(change.to_trigger(&cwd)) {
                    break Err(CliError::Custom("Build task stopped unexpectedly".to_string()));
                }
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down development server...");
                break Ok(());
            }

            joined = &mut server_handle => {
                break match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(CliError::Custom(format!("Server task failed: {}", e))),
                };
            }
        }
    };

    drop(watcher);
    build.abort();
    server_handle.abort();

    if result.is_ok() {
        ui::success("Development server stopped");
    }
    result
}
