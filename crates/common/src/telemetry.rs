//! Logging initialization for the shardflow executor.
//!
//! Installs a `tracing-subscriber` fmt layer with an `EnvFilter` driven by
//! the `SHARDFLOW_LOG` environment variable (defaults to `info`).

use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    let filter = EnvFilter::try_from_env("SHARDFLOW_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init so tests and embedders can call this more than once
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
