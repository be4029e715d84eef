//! Installs the process-wide logger.
//!
//! With the `tracing` feature, a `tracing_subscriber` registry is used,
//! filtered by `RUST_LOG`, and `log` records emitted by the library are
//! bridged into it. Otherwise `env_logger` is used directly.
//!
//! ```bash
//! RUST_LOG=waymark=debug waymark-server
//! ```

/// Initialises the logger. Calling this more than once is harmless,
/// later calls are ignored.
#[cfg(feature = "tracing")]
pub fn initialize_tracer() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer();

    // Initialise tracing with subscribers and environment filter
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(fmt_layer);

    if let Err(err) = registry.try_init() {
        log::debug!("Tracer already initialised: {err}");
    }
}

/// Initialises the logger. Calling this more than once is harmless,
/// later calls are ignored.
#[cfg(not(feature = "tracing"))]
pub fn initialize_tracer() {
    if let Err(err) = env_logger::try_init() {
        log::debug!("Logger already initialised: {err}");
    }
}
