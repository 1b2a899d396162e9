//! Ambient structured logging.
//!
//! Not on the hot path: `Index::build`/`Index::search` emit `tracing`
//! events, but nothing here gates correctness. Host applications are free
//! to install their own subscriber instead of calling [`init_tracing`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr-only `tracing` subscriber filtered by `RUST_LOG`
/// (default `bbq_index=info`).
///
/// Safe to call more than once; a second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "bbq_index=info".into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
