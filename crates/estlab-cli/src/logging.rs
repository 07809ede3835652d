use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Logs go to stderr so that reports written to stdout stay machine-readable.
pub fn init() {
    let fmt_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter = EnvFilter::builder()
        .with_default_directive(DEFAULT_LEVEL.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();
}
