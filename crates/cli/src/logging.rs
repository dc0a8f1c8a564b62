//! Log output.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! picks those records up through its `tracing-log` bridge and writes them to
//! stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter (e.g. `debug`, `mousespeed_core=trace`).
pub const LOG_ENV: &str = "MOUSESPEED_LOG";

/// Pick the filter directive, or `None` to leave logging off.
///
/// The panel owns the terminal, so it only logs when asked to explicitly.
fn filter_directive(env: Option<String>, configured: &str, interactive: bool) -> Option<String> {
    match env {
        Some(spec) if !spec.trim().is_empty() => Some(spec),
        _ if interactive => None,
        _ => Some(configured.to_string()),
    }
}

pub fn init(configured: &str, interactive: bool) {
    let env = std::env::var(LOG_ENV).ok();
    let Some(directive) = filter_directive(env, configured, interactive) else {
        return;
    };

    // Fails only when a subscriber is already installed; keep that one
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins_over_settings() {
        assert_eq!(filter_directive(Some("debug".into()), "warn", false), Some("debug".into()));
        assert_eq!(filter_directive(Some("debug".into()), "warn", true), Some("debug".into()));
    }

    #[test]
    fn settings_level_for_commands() {
        assert_eq!(filter_directive(None, "warn", false), Some("warn".into()));
        assert_eq!(filter_directive(Some("  ".into()), "info", false), Some("info".into()));
    }

    #[test]
    fn panel_is_quiet_by_default() {
        assert_eq!(filter_directive(None, "warn", true), None);
    }
}
