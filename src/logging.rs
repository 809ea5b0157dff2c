//! Tracing setup for the service binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "flashcard_service=info,tower_http=info";

/// Picks the log filter. A usable `RUST_LOG` value wins; an unset, blank or
/// unparseable one falls back to [`DEFAULT_FILTER`].
pub fn build_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Calling this more than once is harmless.
pub fn init_logging() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(rust_log.as_deref()))
        .with(fmt::layer().with_target(true));

    let _ = subscriber.try_init();
}
