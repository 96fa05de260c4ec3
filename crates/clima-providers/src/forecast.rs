//! Short-term forecast client (OpenWeatherMap One Call style).

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ReqwestErrorExt};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Number of daily entries the gateway exposes.
const FORECAST_DAYS: usize = 5;

/// One daily forecast entry as returned to the gateway's clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: String,
    pub day_name: String,
    pub temp_min_celsius: f64,
    pub temp_max_celsius: f64,
    pub condition: String,
}

// Wire types: only the fields we consume.

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    daily: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    dt: i64,
    temp: DailyTemp,
    weather: Vec<WeatherDescription>,
}

#[derive(Debug, Deserialize)]
struct DailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherDescription {
    description: String,
}

/// Client for the daily forecast provider. Constructed only when an API key
/// is configured; without one the forecast feature is disabled upstream.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl ForecastClient {
    /// Create a forecast client against `base_url` (injectable for tests).
    pub fn new(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| e.into_provider_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key,
        })
    }

    /// Fetch up to 5 daily forecast entries for a coordinate.
    pub async fn daily_forecast(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Vec<DailyForecast>, ProviderError> {
        tracing::debug!("Fetching daily forecast for lat={} lng={}", lat, lng);

        let url = format!("{}/data/3.0/onecall", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("exclude", "current,minutely,hourly,alerts".to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", "es".to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.into_provider_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: OneCallResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let forecast: Vec<DailyForecast> = body
            .daily
            .into_iter()
            .take(FORECAST_DAYS)
            .filter_map(daily_entry_to_forecast)
            .collect();

        tracing::info!("Fetched {} daily forecast entries", forecast.len());
        Ok(forecast)
    }
}

fn daily_entry_to_forecast(entry: DailyEntry) -> Option<DailyForecast> {
    let date = match DateTime::from_timestamp(entry.dt, 0) {
        Some(d) => d,
        None => {
            tracing::debug!("Skipping forecast entry with invalid timestamp {}", entry.dt);
            return None;
        }
    };

    let condition = entry
        .weather
        .first()
        .map(|w| capitalize_first(&w.description))
        .unwrap_or_default();

    Some(DailyForecast {
        date: date.format("%Y-%m-%d").to_string(),
        day_name: date.format("%A").to_string(),
        temp_min_celsius: entry.temp.min,
        temp_max_celsius: entry.temp.max,
        condition,
    })
}

/// Upper-case the first character of the provider's localized description
/// and lower-case the rest.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}
