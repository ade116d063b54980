//! Logging initialisation.
//!
//! The embedding service owns the full observability stack; this helper is
//! for hosts (and local tooling) that just want structured logs from the
//! engine.
//!
//! # Environment Variables
//!
//! - `OUTR8_LOG`: tracing filter directive (default: `outr8=info`)

use tracing_subscriber::EnvFilter;

/// Initialise a fmt subscriber for this process.
///
/// `filter` overrides the `OUTR8_LOG` environment variable when given.
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env("OUTR8_LOG")
            .unwrap_or_else(|_| EnvFilter::new("outr8=info")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
