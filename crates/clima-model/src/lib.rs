//! Feature engineering and model scoring for the clima gateway.
//!
//! This crate turns raw irregular hourly climate observations into the fixed,
//! ordered lag-feature vector the pre-trained regression models were trained
//! on, and scores those models:
//!
//! hourly observations -> monthly aggregates -> lag feature vector -> per-variable predictions

pub mod error;
pub mod features;
pub mod monthly;
pub mod predict;
pub mod store;
pub mod types;

pub use error::{FeatureError, PredictionError};
pub use features::{feature_schema, build_features, FeatureVector, FEATURE_COUNT, LAG_MONTHS};
pub use monthly::{normalize, MonthKey, MonthlyAggregate};
pub use predict::{predict_all, Predictions};
pub use store::{LinearModel, ModelStore};
pub use types::{RawObservation, Variable, SENTINEL};
