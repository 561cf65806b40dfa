//! Telemetry and tracing configuration
//!
//! This module configures structured logging for the Labelforge server.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log level
    pub log_level: String,

    /// Whether to use JSON formatting
    pub json_format: bool,

    /// Whether to include timestamps
    pub include_timestamps: bool,

    /// Whether to include thread IDs
    pub include_thread_ids: bool,

    /// Whether to include target module
    pub include_target: bool,
}

impl From<&LoggingConfig> for TelemetryConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            log_level: logging.level.clone(),
            json_format: logging.json_format,
            include_timestamps: logging.include_timestamps,
            include_thread_ids: logging.include_thread_ids,
            include_target: logging.include_target,
        }
    }
}

/// Initialize telemetry with custom configuration
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
pub fn init_with_config(config: TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_timer(fmt::time::SystemTime)
                    .with_target(config.include_target)
                    .with_thread_ids(config.include_thread_ids),
            )
            .init();
        return;
    }

    let fmt_layer = fmt::layer()
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_ids);

    if config.include_timestamps {
        registry
            .with(fmt_layer.with_timer(fmt::time::SystemTime))
            .init();
    } else {
        registry.with(fmt_layer.without_time()).init();
    }
}
