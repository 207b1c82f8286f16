//! Structured logging with `tracing`.
//!
//! Log output goes to stderr so that stdout stays free for the streamed
//! model responses and the per-cycle console summary.

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG`, when set, takes precedence over `level`.
///
/// # Arguments
///
/// * `level` - Minimum log level or filter directive (e.g. `"info"`,
///   `"moriarty_runtime=debug"`).
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init fails only when a global subscriber is already installed
    let _ = subscriber.try_init();
}
