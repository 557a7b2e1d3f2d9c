//! Log output for the CLI. Everything goes to stderr so stdout stays
//! machine-readable.

use tracing_subscriber::EnvFilter;

const FALLBACK_FILTER: &str = "warn";

/// Install a stderr `fmt` subscriber filtered by `log_level`.
///
/// An unparseable filter falls back to `warn`.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|e| {
        eprintln!("ignoring log level '{}': {}", log_level, e);
        EnvFilter::new(FALLBACK_FILTER)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
