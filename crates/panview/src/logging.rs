#![forbid(unsafe_code)]

//! Subscriber setup for the `panview` binary.
//!
//! Library crates only emit `tracing` events; the binary decides where they
//! go. Filtering follows `PANVIEW_LOG` (same syntax as `RUST_LOG`, e.g.
//! `panview.gesture=trace,panview.zoom=debug`) and defaults to warnings.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "PANVIEW_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Filter from `PANVIEW_LOG`, or the default when unset or unparsable.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber, writing to stderr so stdout stays free for
/// replay output. Returns `false` if a subscriber was already installed.
pub fn init(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.is_ok()
}
