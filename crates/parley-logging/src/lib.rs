//! # parley-logging
//!
//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] installs the global subscriber (pretty or JSON, to stderr)
//! - [`capture`] records events in memory for test assertions

#![deny(unsafe_code)]

pub mod capture;

pub use capture::{CapturedEvent, CapturedLogs, capture_logs};

use parley_settings::{LogFormat, LogLevel, LoggingSettings};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Noisy dependencies pinned to `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "tungstenite"];

/// Build the default filter directive for a level.
pub fn filter_directive(level: LogLevel) -> String {
    let mut directive = level.as_filter_str().to_string();
    for target in QUIET_TARGETS {
        directive.push(',');
        directive.push_str(target);
        directive.push_str("=warn");
    }
    directive
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Subsequent calls are no-ops.
pub fn init_subscriber(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(settings.level)));

    let registry = tracing_subscriber::registry().with(filter);

    // try_init fails only when a global subscriber is already set
    let _ = match settings.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}
