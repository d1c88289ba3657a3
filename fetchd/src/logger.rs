use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "fetchd=info,tower_http=info";

/// Installs the global subscriber. Hold the returned guard until exit so buffered lines get flushed.
pub fn init() -> tracing_appender::non_blocking::WorkerGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_line_number(true)
                .with_writer(non_blocking_writer),
        )
        .with(filter)
        .init();

    guard
}
