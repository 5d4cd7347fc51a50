use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use crate::types::ids::SourceId;

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::ConfigError(format!("invalid log filter: {}", e)))?;

    let installed = if config.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    installed.map_err(|e| Error::ConfigError(e.to_string()))
}

pub fn trace_refresh(source_id: &SourceId) -> Span {
    tracing::debug_span!(
        "refresh",
        source_id = %source_id,
    )
}

pub fn trace_relay(operation: &'static str) -> Span {
    tracing::info_span!(
        "relay",
        operation = operation,
    )
}
