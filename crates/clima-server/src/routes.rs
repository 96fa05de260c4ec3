//! The prediction route: fetches both upstreams concurrently and merges
//! them into one response. Every upstream or model failure degrades a
//! section of the body; only missing coordinates produce a non-200.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use clima_model::{build_features, normalize, predict_all, Predictions};
use clima_providers::{fetch_window, DailyForecast};

use crate::state::AppState;

/// Build the gateway router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/predict/full", get(predict_full))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// The merged prediction response.
#[derive(Debug, Serialize)]
struct PredictFullResponse {
    location: String,
    short_term_forecast_5_days: Option<Vec<DailyForecast>>,
    long_term_ml_prediction_next_month_avg: Option<MlOutcome>,
}

/// ML section outcome: a prediction object when scoring succeeded, or a
/// structured error when a model failed on well-formed features. `None` at
/// the field level means "never tried" (no data, no models).
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MlOutcome {
    Ready(Predictions),
    Failed { error: String },
}

async fn predict_full(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (Some(lat), Some(lng)) = (coord(&params, "lat"), coord(&params, "lng")) else {
        let body = ErrorBody {
            error: "Query parameters \"lat\" and \"lng\" are required.".to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    // The two upstream fetches are independent; issue them concurrently
    // and merge only here.
    let (forecast, ml) = tokio::join!(
        short_term_forecast(&state, lat, lng),
        ml_prediction(&state, lat, lng)
    );

    let body = PredictFullResponse {
        location: format!("Lima, Peru (lat: {}, lon: {})", lat, lng),
        short_term_forecast_5_days: forecast,
        long_term_ml_prediction_next_month_avg: ml,
    };
    Json(body).into_response()
}

fn coord(params: &HashMap<String, String>, name: &str) -> Option<f64> {
    params.get(name).and_then(|raw| raw.parse::<f64>().ok())
}

async fn short_term_forecast(state: &AppState, lat: f64, lng: f64) -> Option<Vec<DailyForecast>> {
    let client = state.forecast.as_ref()?;
    match client.daily_forecast(lat, lng).await {
        Ok(forecast) => Some(forecast),
        Err(e) => {
            tracing::warn!("Forecast provider unavailable: {}", e);
            None
        }
    }
}

/// Run the full feature pipeline: fetch history, aggregate to months,
/// build the lag vector, score every loaded model.
async fn ml_prediction(state: &AppState, lat: f64, lng: f64) -> Option<MlOutcome> {
    if state.models.is_empty() {
        return None;
    }

    let now = Utc::now();
    let (start, end) = fetch_window(now.date_naive());

    let observations = match state.historical.hourly_observations(lat, lng, start, end).await {
        Ok(observations) => observations,
        Err(e) => {
            tracing::warn!("Historical data provider unavailable: {}", e);
            return None;
        }
    };

    let aggregates = match normalize(&observations) {
        Ok(aggregates) => aggregates,
        Err(e) => {
            tracing::warn!("Cannot aggregate history: {}", e);
            return None;
        }
    };

    let features = match build_features(&aggregates, now.month()) {
        Ok(features) => features,
        Err(e) => {
            tracing::warn!("Cannot build feature vector: {}", e);
            return None;
        }
    };

    match predict_all(&state.models, &features) {
        Ok(predictions) => Some(MlOutcome::Ready(predictions)),
        Err(e) => {
            tracing::error!("Model scoring failed: {}", e);
            Some(MlOutcome::Failed {
                error: e.to_string(),
            })
        }
    }
}
