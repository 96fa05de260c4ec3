//! Core infrastructure for the clima gateway: environment-sourced
//! configuration and process-wide initialization.

pub mod config;

pub use config::{Config, ConfigError, ValidationResult};

use anyhow::Result;

/// Initialize process-wide infrastructure (tracing/logging).
///
/// Call once from the binary before anything else logs.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("clima core initialized");
    Ok(())
}
