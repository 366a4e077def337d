//! tracing-subscriber initialisation
//!
//! `RUST_LOG` wins over the configured filter.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber; later calls are no-ops
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Filter directive for a `-v` count, layered on top of the configured one
pub fn filter_for_verbosity(configured: &str, verbose: u8) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => format!("{},rolerag=debug", configured),
        _ => "debug".to_string(),
    }
}
