use std::sync::Arc;

use anyhow::{Context, Result};

use clima_core::Config;
use clima_model::ModelStore;
use clima_providers::{ForecastClient, HistoricalClient};

/// Application state shared across handlers.
///
/// Everything here is read-only after startup: the model store is loaded
/// once and never mutated, the clients hold their own connection pools.
#[derive(Clone)]
pub struct AppState {
    /// Absent when no forecast API key is configured; the forecast section
    /// then degrades to null.
    pub forecast: Option<ForecastClient>,
    pub historical: HistoricalClient,
    pub models: Arc<ModelStore>,
}

impl AppState {
    /// Build clients and load model artifacts per the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let forecast = match &config.forecast.api_key {
            Some(key) => Some(
                ForecastClient::new(key.clone(), config.forecast.base_url.clone())
                    .context("creating forecast client")?,
            ),
            None => {
                tracing::warn!("No forecast API key configured; forecast disabled");
                None
            }
        };

        let historical = HistoricalClient::new(config.historical.base_url.clone())
            .context("creating historical data client")?;

        let models = ModelStore::load(&config.models.dir);
        if models.is_empty() {
            tracing::warn!(
                "No model artifacts loaded from {}; ML predictions disabled",
                config.models.dir.display()
            );
        }

        Ok(Self {
            forecast,
            historical,
            models: Arc::new(models),
        })
    }
}
