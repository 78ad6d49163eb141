//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use devedge_build::BuildError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report, one line per compiler message.
pub fn build_error_to_miette(err: BuildError) -> Report {
    if err.errors.len() <= 1 {
        return miette::miette!("{}", err);
    }

    let lines: Vec<String> = err
        .errors
        .iter()
        .map(|message| match message.target {
            Some(ref target) => format!("  [{}] {}", target, message),
            None => format!("  {}", message),
        })
        .collect();

    miette::miette!(
        "Build failed with {} errors:\n{}",
        err.errors.len(),
        lines.join("\n")
    )
}
