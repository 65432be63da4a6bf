//! Logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Result, SegmenterError};

/// Default filter directive for a configured level
pub fn default_directive(level: &str) -> String {
    format!("hls_text_segmenter={}", level.to_ascii_lowercase())
}

/// Initialize logging with tracing.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr; stdout is reserved for segment output.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(&config.level)))
        .map_err(|e| {
            SegmenterError::Config(format!("invalid log level {:?}: {}", config.level, e))
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| SegmenterError::Config(format!("logging already initialized: {}", e)))
}
