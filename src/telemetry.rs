//! Tracing setup for binaries and examples embedding the engine.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the host's job. This helper wires the common case: fmt output to stderr
//! with an `EnvFilter` honoring `RUST_LOG`, falling back to a quiet default.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a global fmt subscriber.
///
/// Respects `RUST_LOG` when set; otherwise only warnings and above are
/// emitted, with engine spans at info. Calling this twice panics (the global
/// subscriber can only be set once), so hosts with their own subscriber
/// should skip it entirely.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn,relayflow=info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
