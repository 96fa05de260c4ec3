use thiserror::Error;

use crate::monthly::MonthKey;
use crate::types::Variable;

/// Errors raised while building the lag feature vector from history.
///
/// Any of these means "the ML section of the response is null"; they never
/// fail the request as a whole.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("insufficient history: have {actual} aggregated months, need {required}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("history has a gap: {next} does not follow {prev}")]
    NonConsecutiveHistory { prev: MonthKey, next: MonthKey },

    #[error("no valid {variable} readings for {month}")]
    MissingVariable { month: MonthKey, variable: Variable },

    #[error("month feature out of range: {month}")]
    MonthOutOfRange { month: u32 },

    #[error("feature schema mismatch: {detail}")]
    SchemaMismatch { detail: String },
}

/// Errors raised while scoring models against a well-formed feature vector.
///
/// Unlike [`FeatureError`], these surface to the client as a structured
/// error object so "we tried and a model failed" is distinguishable from
/// "we never tried".
#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("model for {target} references feature {feature} absent from the vector")]
    MissingFeature { target: Variable, feature: String },
}
