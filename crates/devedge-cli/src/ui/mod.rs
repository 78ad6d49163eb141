//! Terminal status output.
//!
//! Short human-facing lines on stderr (startup, listening addresses, build
//! summaries). Everything else goes through `tracing`.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use devedge_build::format_size;
pub use format::{format_duration, print_build_summary};
pub use messages::{info, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to whether stderr is a
/// terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decide once whether status lines are colored.
///
/// Should be called early in main, with the `--no-color` flag.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_colors_disabled() {
        init_colors(true);
        assert!(!colors_enabled());
        init_colors(false);
    }
}
