//! Logging setup.
//!
//! Structured logging through the `tracing` ecosystem. Request lines, build
//! results and watcher events are all emitted as `tracing` events; this module
//! only installs the subscriber.
//!
//! # Example
//!
//! ```rust,no_run
//! use devedge_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("HTTP server listening: {}", 10040);
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "devedge_cli=debug,devedge_build=debug,tower_http=debug";

/// Filter used with `--quiet`.
pub const QUIET_FILTER: &str = "devedge_cli=error,devedge_build=error";

/// Filter used when neither flag nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "devedge_cli=info,devedge_build=info";

/// Pick the filter for the given flags.
///
/// Order: `--verbose`, then `--quiet`, then `RUST_LOG`, then the default.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before any logging.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging (overrides `quiet`)
/// * `quiet` - Only show error-level logs
/// * `no_color` - Disable colored output
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize the subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise the terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so these
    // tests only exercise filter construction.

    #[test]
    fn test_filters_parse() {
        let verbose = filter_for(true, false).to_string();
        assert!(verbose.contains("devedge_cli=debug"));

        let quiet = filter_for(false, true).to_string();
        assert!(quiet.contains("devedge_build=error"));
    }

    #[test]
    fn test_verbose_wins_over_quiet() {
        let filter = filter_for(true, true).to_string();
        assert!(filter.contains("debug"));
    }
}
