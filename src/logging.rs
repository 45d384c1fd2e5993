// ABOUTME: Logging configuration and structured logging setup
// ABOUTME: Selects log level and output format from the environment
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Structured logging configuration built on `tracing`.

use anyhow::Result;
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter directive (`RUST_LOG` syntax)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        Self { level, format }
    }
}

/// Initialize the global tracing subscriber from the environment
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_from_env() -> Result<()> {
    init(&LoggingConfig::from_env())
}

/// Initialize the global tracing subscriber with the given configuration
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
