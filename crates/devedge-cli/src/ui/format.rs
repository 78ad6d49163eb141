//! Formatting utilities for durations and build summaries. Sizes come from
//! [`format_size`] in `devedge-build`.

use super::colors_enabled;
use console::Term;
use devedge_build::{BuildStats, format_size};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format a duration as ms, seconds, or minutes and seconds.
///
/// ```
/// use std::time::Duration;
/// use devedge_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the result of a one-shot build to stderr.
pub fn print_build_summary(stats: &BuildStats, duration: Duration) {
    let color = colors_enabled();
    let width = (Term::stderr().size().1 as usize).min(80);
    let rule = "─".repeat(width);

    if color {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", rule);

    for file in &stats.output_files {
        if color {
            eprintln!("  {} {}", "▸".blue(), file.bright_white().bold());
        } else {
            eprintln!("  ▸ {}", file);
        }
    }
    eprintln!(
        "  modules {} ({})",
        stats.modules,
        format_size(stats.module_bytes)
    );
    eprintln!(
        "  imports {} ({})",
        stats.imports,
        format_size(stats.import_bytes)
    );

    eprintln!("{}", rule);
    let total = format_size(stats.output_bytes);
    let elapsed = format_duration(duration);
    if color {
        eprintln!("  {} {} in {}", "Total:".bold(), total.green(), elapsed.green());
    } else {
        eprintln!("  Total: {} in {}", total, elapsed);
    }
}
