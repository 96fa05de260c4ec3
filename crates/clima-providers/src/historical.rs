//! Historical hourly climate data client (NASA POWER style).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use clima_model::{RawObservation, Variable};

use crate::error::{ProviderError, ReqwestErrorExt};

const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Days the source lags behind real time; the most recent days may be
/// incomplete or absent, so the fetch window ends before them.
const REPORTING_LAG_DAYS: u64 = 5;

/// Months of history requested; one more than the 6 lag months because the
/// trailing month of the window is dropped as partial.
const WINDOW_MONTHS: u32 = 7;

// Wire types: `properties.parameter` maps variable code -> YYYYMMDDHH -> value.

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: HashMap<String, HashMap<String, f64>>,
}

/// Compute the historical fetch window ending 5 days before
/// `reference_end` and reaching back 7 months from there.
pub fn fetch_window(reference_end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = reference_end
        .checked_sub_days(Days::new(REPORTING_LAG_DAYS))
        .unwrap_or(reference_end);
    let start = end
        .checked_sub_months(Months::new(WINDOW_MONTHS))
        .unwrap_or(end);
    (start, end)
}

/// Client for the hourly historical climate data provider.
#[derive(Debug, Clone)]
pub struct HistoricalClient {
    client: Arc<Client>,
    base_url: String,
}

impl HistoricalClient {
    /// Create a historical data client against `base_url` (injectable for
    /// tests).
    pub fn new(base_url: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| e.into_provider_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    /// Fetch raw hourly observations for all 4 variables over `[start, end]`.
    pub async fn hourly_observations(
        &self,
        lat: f64,
        lng: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawObservation>, ProviderError> {
        tracing::debug!(
            "Fetching hourly history for lat={} lng={} from {} to {}",
            lat,
            lng,
            start,
            end
        );

        let parameters = Variable::ALL
            .iter()
            .map(|v| v.code())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}/api/temporal/hourly/point", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("start", start.format("%Y%m%d").to_string()),
                ("end", end.format("%Y%m%d").to_string()),
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                ("community", "re".to_string()),
                ("parameters", parameters),
                ("format", "json".to_string()),
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

        let body: PowerResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let observations = merge_parameters(body.properties.parameter);
        tracing::info!("Fetched {} hourly observations", observations.len());
        Ok(observations)
    }
}

/// Merge the per-variable series into per-timestamp observations, in
/// chronological order. Unknown variables and unparseable timestamps are
/// skipped with a debug log, not treated as fatal.
fn merge_parameters(parameters: HashMap<String, HashMap<String, f64>>) -> Vec<RawObservation> {
    let mut by_timestamp: BTreeMap<NaiveDateTime, HashMap<Variable, f64>> = BTreeMap::new();

    for (code, series) in parameters {
        let Some(variable) = Variable::from_code(&code) else {
            tracing::debug!("Skipping unknown parameter {}", code);
            continue;
        };
        for (stamp, value) in series {
            match parse_hour_stamp(&stamp) {
                Some(timestamp) => {
                    by_timestamp.entry(timestamp).or_default().insert(variable, value);
                }
                None => {
                    tracing::debug!("Skipping unparseable timestamp {}", stamp);
                }
            }
        }
    }

    by_timestamp
        .into_iter()
        .map(|(timestamp, values)| RawObservation { timestamp, values })
        .collect()
}

/// Parse an upstream `YYYYMMDDHH` stamp.
fn parse_hour_stamp(stamp: &str) -> Option<NaiveDateTime> {
    if stamp.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(&stamp[..8], "%Y%m%d").ok()?;
    let hour: u32 = stamp[8..].parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}
