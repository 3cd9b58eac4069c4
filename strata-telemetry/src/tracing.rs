use tracing_subscriber::EnvFilter;

/// Initializes tracing for a binary.
///
/// The filter is taken from `RUST_LOG` when set, defaulting to `info`.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    ::tracing::info!(service = service_name, "tracing initialized");
}

/// Initializes tracing for tests.
///
/// Safe to call from multiple tests; later calls are no-ops because a global
/// subscriber can only be installed once per process.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
