//! Logging setup.
//!
//! Library code only emits `tracing` events; the binary installs the subscriber.
//! `RUST_LOG` takes precedence over the configured filter.

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

/// Installs a stderr subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()
}
