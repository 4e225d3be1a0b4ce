// Logging - tracing subscriber setup for the binaries

use crate::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber.
///
/// Respects `ESSAY_RANKING_LOG` (EnvFilter syntax), falling back to
/// `default_level`. Output goes to stderr so CSV/JSON on stdout stays clean.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
