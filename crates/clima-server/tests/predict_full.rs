//! End-to-end tests: real listener, mocked upstream providers, model
//! artifacts in a temp directory.

use std::path::Path;
use std::sync::Arc;

use chrono::{Months, Utc};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clima_model::ModelStore;
use clima_providers::{ForecastClient, HistoricalClient};
use clima_server::{router, AppState};

/// Bind the router to an ephemeral port and return its base URL.
async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

fn one_call_body() -> serde_json::Value {
    serde_json::json!({
        "daily": (0..6).map(|day| serde_json::json!({
            "dt": 1_756_512_000 + day * 86_400,
            "temp": {"min": 14.0, "max": 19.0},
            "weather": [{"description": "cielo claro"}]
        })).collect::<Vec<_>>()
    })
}

/// 9 calendar months of synthetic hourly history ending at the current
/// month, constant per variable so predictions are deterministic.
fn power_body() -> serde_json::Value {
    let today = Utc::now().date_naive();
    let constants = [("T2M", 18.0), ("RH2M", 80.0), ("WS2M", 3.0), ("PS", 100.0)];

    let mut parameter = serde_json::Map::new();
    for (code, value) in constants {
        let mut series = serde_json::Map::new();
        for back in 0..9u32 {
            let month = today.checked_sub_months(Months::new(back)).unwrap();
            for hour in [0, 1] {
                let stamp = format!("{}10{:02}", month.format("%Y%m"), hour);
                series.insert(stamp, serde_json::json!(value));
            }
        }
        parameter.insert(code.to_string(), serde_json::Value::Object(series));
    }

    serde_json::json!({"properties": {"parameter": parameter}})
}

fn write_models(dir: &Path) {
    let artifacts = [
        // With every T2M monthly mean at 18.0: 1 + 0.5*18 + 0.5*18 = 19.0
        (
            "T2M",
            serde_json::json!({"target": "T2M", "intercept": 1.0,
                "coefficients": {"T2M_lag_1": 0.5, "T2M_lag_6": 0.5}}),
        ),
        (
            "RH2M",
            serde_json::json!({"target": "RH2M", "intercept": 81.256, "coefficients": {}}),
        ),
        // 1.1 * WS2M_lag_3 = 1.1 * 3.0 = 3.3
        (
            "WS2M",
            serde_json::json!({"target": "WS2M", "intercept": 0.0,
                "coefficients": {"WS2M_lag_3": 1.1}}),
        ),
        (
            "PS",
            serde_json::json!({"target": "PS", "intercept": 100.0, "coefficients": {}}),
        ),
    ];
    for (var, body) in artifacts {
        std::fs::write(
            dir.join(format!("model_{}.json", var)),
            serde_json::to_string(&body).unwrap(),
        )
        .unwrap();
    }
}

async fn mock_forecast_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body()))
        .mount(server)
        .await;
}

async fn mock_historical_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/temporal/hourly/point"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_body()))
        .mount(server)
        .await;
}

fn state(forecast: Option<&MockServer>, historical: &MockServer, model_dir: &Path) -> AppState {
    AppState {
        forecast: forecast
            .map(|s| ForecastClient::new("test-key".to_string(), s.uri()).unwrap()),
        historical: HistoricalClient::new(historical.uri()).unwrap(),
        models: Arc::new(ModelStore::load(model_dir)),
    }
}

#[tokio::test]
async fn test_happy_path_merges_both_sections() {
    let forecast_server = MockServer::start().await;
    let historical_server = MockServer::start().await;
    mock_forecast_ok(&forecast_server).await;
    mock_historical_ok(&historical_server).await;
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());

    let base = spawn_app(state(Some(&forecast_server), &historical_server, models.path())).await;
    let response = reqwest::get(format!("{}/predict/full?lat=-12.05&lng=-77.04", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["location"], "Lima, Peru (lat: -12.05, lon: -77.04)");

    let forecast = body["short_term_forecast_5_days"].as_array().unwrap();
    assert_eq!(forecast.len(), 5);
    assert_eq!(forecast[0]["condition"], "Cielo claro");
    assert_eq!(forecast[0]["temp_min_celsius"], 14.0);

    let ml = &body["long_term_ml_prediction_next_month_avg"];
    assert_eq!(ml["temperature_celsius"], 19.0);
    assert_eq!(ml["humidity_percent"], 81.26);
    assert_eq!(ml["wind_speed_ms"], 3.3);
    assert_eq!(ml["pressure_kpa"], 100.0);
}

#[tokio::test]
async fn test_historical_failure_nulls_ml_section_only() {
    let forecast_server = MockServer::start().await;
    let historical_server = MockServer::start().await;
    mock_forecast_ok(&forecast_server).await;
    Mock::given(method("GET"))
        .and(path("/api/temporal/hourly/point"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&historical_server)
        .await;
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());

    let base = spawn_app(state(Some(&forecast_server), &historical_server, models.path())).await;
    let response = reqwest::get(format!("{}/predict/full?lat=-12.05&lng=-77.04", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["long_term_ml_prediction_next_month_avg"].is_null());
    assert!(body["short_term_forecast_5_days"].is_array());
}

#[tokio::test]
async fn test_missing_lat_is_bad_request() {
    let historical_server = MockServer::start().await;
    let models = tempfile::tempdir().unwrap();

    let base = spawn_app(state(None, &historical_server, models.path())).await;
    let response = reqwest::get(format!("{}/predict/full?lng=-77.04", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_no_api_key_nulls_forecast_section_only() {
    let historical_server = MockServer::start().await;
    mock_historical_ok(&historical_server).await;
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());

    let base = spawn_app(state(None, &historical_server, models.path())).await;
    let response = reqwest::get(format!("{}/predict/full?lat=-12.05&lng=-77.04", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["short_term_forecast_5_days"].is_null());
    assert!(body["long_term_ml_prediction_next_month_avg"].is_object());
}

#[tokio::test]
async fn test_incompatible_model_surfaces_structured_error() {
    let historical_server = MockServer::start().await;
    mock_historical_ok(&historical_server).await;
    let models = tempfile::tempdir().unwrap();
    std::fs::write(
        models.path().join("model_T2M.json"),
        r#"{"target": "T2M", "intercept": 0.0, "coefficients": {"T2M_lag_99": 1.0}}"#,
    )
    .unwrap();

    let base = spawn_app(state(None, &historical_server, models.path())).await;
    let response = reqwest::get(format!("{}/predict/full?lat=-12.05&lng=-77.04", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    // "we tried and a model failed" is an error object, not null.
    let ml = &body["long_term_ml_prediction_next_month_avg"];
    assert!(ml["error"].is_string());
}

#[tokio::test]
async fn test_no_models_nulls_ml_section() {
    let historical_server = MockServer::start().await;
    mock_historical_ok(&historical_server).await;
    let models = tempfile::tempdir().unwrap();

    let base = spawn_app(state(None, &historical_server, models.path())).await;
    let body: serde_json::Value =
        reqwest::get(format!("{}/predict/full?lat=-12.05&lng=-77.04", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert!(body["long_term_ml_prediction_next_month_avg"].is_null());
}

#[tokio::test]
async fn test_identical_requests_are_idempotent() {
    let historical_server = MockServer::start().await;
    mock_historical_ok(&historical_server).await;
    let models = tempfile::tempdir().unwrap();
    write_models(models.path());

    let base = spawn_app(state(None, &historical_server, models.path())).await;
    let url = format!("{}/predict/full?lat=-12.05&lng=-77.04", base);

    let first: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    let second: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(
        first["long_term_ml_prediction_next_month_avg"],
        second["long_term_ml_prediction_next_month_avg"]
    );
}
