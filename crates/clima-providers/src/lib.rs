//! Upstream provider clients for the clima gateway.
//!
//! Two independent HTTP collaborators: a short-term forecast provider
//! (OpenWeatherMap One Call) and a historical hourly climate data provider
//! (NASA POWER). Both degrade to [`ProviderError`]; raw transport errors
//! never reach the gateway's own HTTP surface.

pub mod error;
pub mod forecast;
pub mod historical;

pub use error::ProviderError;
pub use forecast::{DailyForecast, ForecastClient};
pub use historical::{fetch_window, HistoricalClient};
