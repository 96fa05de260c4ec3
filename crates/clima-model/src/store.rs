//! Model store: the four pre-trained single-target regressors, loaded once
//! at startup from JSON artifacts and shared read-only across requests.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::PredictionError;
use crate::features::FeatureVector;
use crate::types::Variable;

/// On-disk artifact shape: `model_<VAR>.json`.
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    target: String,
    intercept: f64,
    coefficients: HashMap<String, f64>,
}

/// One independently-trained linear regressor. Each model looks its
/// coefficients' features up by name, so it scores against the full
/// 25-entry vector while using only the subset it was trained on.
#[derive(Debug, Clone)]
pub struct LinearModel {
    target: Variable,
    intercept: f64,
    coefficients: Vec<(String, f64)>,
}

impl LinearModel {
    /// Construct a model directly; used when loading artifacts and by tests.
    pub fn new(target: Variable, intercept: f64, coefficients: Vec<(String, f64)>) -> Self {
        Self {
            target,
            intercept,
            coefficients,
        }
    }

    pub fn target(&self) -> Variable {
        self.target
    }

    /// Score the model against a complete feature vector. A coefficient
    /// naming a feature the vector does not carry means the model was
    /// trained on an incompatible schema, which fails the whole prediction.
    pub fn score(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let mut acc = self.intercept;
        for (name, weight) in &self.coefficients {
            let value = features
                .get(name)
                .ok_or_else(|| PredictionError::MissingFeature {
                    target: self.target,
                    feature: name.clone(),
                })?;
            acc += weight * value;
        }
        Ok(acc)
    }
}

/// All loaded regressors, keyed by target variable. Immutable after load;
/// handed to the prediction aggregator as an explicit dependency rather
/// than living in process-global state.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    models: HashMap<Variable, LinearModel>,
}

impl ModelStore {
    /// Build a store from already-constructed models (test doubles).
    pub fn from_models(models: impl IntoIterator<Item = LinearModel>) -> Self {
        Self {
            models: models.into_iter().map(|m| (m.target(), m)).collect(),
        }
    }

    /// Load `model_<VAR>.json` for every target variable from `dir`.
    ///
    /// A missing or corrupt artifact disables that variable only: it is
    /// logged as a warning and its prediction field stays null. Loading
    /// never fails startup.
    pub fn load(dir: &Path) -> Self {
        let mut models = HashMap::new();

        for var in Variable::ALL {
            let path = dir.join(format!("model_{}.json", var.code()));
            match load_artifact(&path, var) {
                Ok(model) => {
                    tracing::info!("Loaded model for {} from {}", var, path.display());
                    models.insert(var, model);
                }
                Err(reason) => {
                    tracing::warn!(
                        "Model for {} unavailable ({}): predictions for it are disabled",
                        var,
                        reason
                    );
                }
            }
        }

        Self { models }
    }

    pub fn get(&self, variable: Variable) -> Option<&LinearModel> {
        self.models.get(&variable)
    }

    /// True when no artifact loaded at all; the ML section of every
    /// response is then null.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }
}

fn load_artifact(path: &Path, expected: Variable) -> Result<LinearModel, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let artifact: ModelArtifact = serde_json::from_str(&raw).map_err(|e| e.to_string())?;

    if Variable::from_code(&artifact.target) != Some(expected) {
        return Err(format!(
            "artifact target {} does not match expected {}",
            artifact.target, expected
        ));
    }

    Ok(LinearModel::new(
        expected,
        artifact.intercept,
        artifact.coefficients.into_iter().collect(),
    ))
}
