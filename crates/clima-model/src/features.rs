//! Lag feature builder: maps 6 monthly aggregates onto the fixed, ordered
//! feature schema the regression models were trained on.
//!
//! The lag direction is the easy-to-invert part: the most recent month is
//! lag 1, the oldest is lag 6. The traversal below is an explicit indexed
//! walk from the end of the sequence, not a reliance on map iteration order.

use std::collections::HashMap;

use crate::error::FeatureError;
use crate::monthly::MonthlyAggregate;
use crate::types::Variable;

/// Number of trailing months turned into lag features.
pub const LAG_MONTHS: usize = 6;

/// Total schema size: 4 variables x 6 lags + the `month` feature.
pub const FEATURE_COUNT: usize = Variable::ALL.len() * LAG_MONTHS + 1;

/// Name of the categorical current-month feature.
const MONTH_FEATURE: &str = "month";

/// The fixed feature schema, in training order: for each lag 1..=6 the four
/// variables `T2M_lag_L, RH2M_lag_L, WS2M_lag_L, PS_lag_L`, then `month`.
pub fn feature_schema() -> Vec<String> {
    let mut names = Vec::with_capacity(FEATURE_COUNT);
    for lag in 1..=LAG_MONTHS {
        for var in Variable::ALL {
            names.push(format!("{}_lag_{}", var.code(), lag));
        }
    }
    names.push(MONTH_FEATURE.to_string());
    names
}

/// A flat feature mapping whose keys and order are exactly the schema the
/// models were trained on. Construction is only possible through
/// [`build_features`], which validates against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// Feature value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    /// Entries in schema order.
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the 25-entry feature vector from exactly 6 chronologically ordered
/// monthly aggregates plus the calendar month (1-12) of the request time.
///
/// The aggregate at the *end* of the slice (most recent) becomes lag 1, the
/// first (oldest) becomes lag 6. Fewer or more than 6 aggregates, a variable
/// with no valid mean in any month, or an out-of-range month all fail; the
/// builder never zero-fills.
pub fn build_features(
    aggregates: &[MonthlyAggregate],
    current_month: u32,
) -> Result<FeatureVector, FeatureError> {
    if aggregates.len() != LAG_MONTHS {
        return Err(FeatureError::InsufficientHistory {
            required: LAG_MONTHS,
            actual: aggregates.len(),
        });
    }
    if !(1..=12).contains(&current_month) {
        return Err(FeatureError::MonthOutOfRange {
            month: current_month,
        });
    }

    let mut features: HashMap<String, f64> = HashMap::with_capacity(FEATURE_COUNT);
    for i in 0..aggregates.len() {
        // Walk from the most recent month backwards: lag 1 is the last
        // element, lag 6 the first.
        let aggregate = &aggregates[aggregates.len() - 1 - i];
        let lag = i + 1;
        for var in Variable::ALL {
            features.insert(format!("{}_lag_{}", var.code(), lag), aggregate.mean(var)?);
        }
    }
    features.insert(MONTH_FEATURE.to_string(), f64::from(current_month));

    into_schema_order(features)
}

/// Re-order an assembled feature map against the fixed schema. A map would
/// otherwise hand the models transposed inputs without any error, so both
/// missing and unexpected keys are hard failures here.
fn into_schema_order(mut features: HashMap<String, f64>) -> Result<FeatureVector, FeatureError> {
    let mut entries = Vec::with_capacity(FEATURE_COUNT);
    for name in feature_schema() {
        let value = features
            .remove(&name)
            .ok_or_else(|| FeatureError::SchemaMismatch {
                detail: format!("missing feature {}", name),
            })?;
        entries.push((name, value));
    }

    if let Some(name) = features.into_keys().next() {
        return Err(FeatureError::SchemaMismatch {
            detail: format!("unexpected feature {}", name),
        });
    }

    Ok(FeatureVector { entries })
}
