pub mod config;
pub mod error;

pub use config::{CalculatorConfig, Config, ValidationResult, WeatherConfig};
pub use error::{AppError, CalcError, ConfigError, NetworkError, WeatherError};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("QuickCalc core initialized");
    Ok(())
}
