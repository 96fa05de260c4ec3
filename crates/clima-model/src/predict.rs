//! Prediction aggregator: scores every loaded regressor against one feature
//! vector and assembles the structured multi-variable result.

use serde::Serialize;

use crate::error::PredictionError;
use crate::features::FeatureVector;
use crate::store::ModelStore;
use crate::types::Variable;

/// Next-month average predictions, one field per target variable, each
/// rounded to 2 decimals. A field is null when that variable's model was
/// not loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predictions {
    pub temperature_celsius: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub pressure_kpa: Option<f64>,
}

/// Score all loaded models against the same complete feature vector.
///
/// All-or-nothing: if any single model fails to score, the whole prediction
/// fails rather than returning 3-of-4 variables. Models that were never
/// loaded are not failures; their field is simply null.
pub fn predict_all(
    store: &ModelStore,
    features: &FeatureVector,
) -> Result<Predictions, PredictionError> {
    let mut scored: [Option<f64>; 4] = [None; 4];
    for (slot, &var) in scored.iter_mut().zip(Variable::ALL.iter()) {
        if let Some(model) = store.get(var) {
            *slot = Some(round2(model.score(features)?));
        }
    }

    let [t2m, rh2m, ws2m, ps] = scored;
    Ok(Predictions {
        temperature_celsius: t2m,
        humidity_percent: rh2m,
        wind_speed_ms: ws2m,
        pressure_kpa: ps,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
