//! Structured logging with tracing

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from the logging configuration.
///
/// `RUST_LOG` wins over the configured level when set, so operators can
/// raise verbosity without touching config files.
pub fn init_tracing(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.format.as_str() {
        "json" => builder.json().try_init()?,
        _ => builder.pretty().try_init()?,
    }

    Ok(())
}
