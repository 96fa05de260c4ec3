//! Historical data normalizer: collapses raw irregular hourly observations
//! into one gap-tolerant mean per variable per calendar month, then selects
//! the 6-month window the lag feature builder consumes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Datelike;

use crate::error::FeatureError;
use crate::types::{RawObservation, Variable, SENTINEL};

/// The most recent aggregated month is assumed partial (reporting lag) and
/// is dropped, so 7 aggregated months are needed to produce the 6 lags.
const REQUIRED_MONTHS: usize = crate::features::LAG_MONTHS + 1;

/// A calendar month key (year + month), ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The calendar month immediately after this one.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    fn of(date: impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One calendar month's mean per variable, computed over non-sentinel
/// readings only. A variable with zero valid readings in the month is
/// absent from `means` rather than zero.
#[derive(Debug, Clone)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    means: HashMap<Variable, f64>,
}

impl MonthlyAggregate {
    /// Construct an aggregate directly; used by the normalizer and by tests
    /// that feed the feature builder synthetic months.
    pub fn new(month: MonthKey, means: HashMap<Variable, f64>) -> Self {
        Self { month, means }
    }

    /// The month's mean for `variable`, or `FeatureError::MissingVariable`
    /// when the month had no valid readings for it.
    pub fn mean(&self, variable: Variable) -> Result<f64, FeatureError> {
        self.means
            .get(&variable)
            .copied()
            .ok_or(FeatureError::MissingVariable {
                month: self.month,
                variable,
            })
    }
}

/// Collapse raw hourly observations into exactly 6 chronologically ordered
/// monthly aggregates.
///
/// Sentinel (`-999`) readings are excluded from every mean. The most recent
/// aggregated month is dropped as potentially partial, and the 6 months
/// immediately preceding it are returned, oldest first. Fewer than 7
/// aggregated months is `FeatureError::InsufficientHistory`.
pub fn normalize(observations: &[RawObservation]) -> Result<Vec<MonthlyAggregate>, FeatureError> {
    // (sum, count) per variable per month, months kept in calendar order.
    let mut accumulator: BTreeMap<MonthKey, HashMap<Variable, (f64, usize)>> = BTreeMap::new();

    for obs in observations {
        let month = accumulator.entry(MonthKey::of(obs.timestamp)).or_default();
        for (&variable, &value) in &obs.values {
            if value == SENTINEL {
                continue;
            }
            let cell = month.entry(variable).or_insert((0.0, 0));
            cell.0 += value;
            cell.1 += 1;
        }
    }

    let mut aggregates: Vec<MonthlyAggregate> = accumulator
        .into_iter()
        .map(|(month, cells)| {
            let means = cells
                .into_iter()
                .map(|(variable, (sum, count))| (variable, sum / count as f64))
                .collect();
            MonthlyAggregate::new(month, means)
        })
        .collect();

    if aggregates.len() < REQUIRED_MONTHS {
        return Err(FeatureError::InsufficientHistory {
            required: REQUIRED_MONTHS,
            actual: aggregates.len(),
        });
    }

    // A month with no rows at all leaves no entry in the accumulator, so
    // the lag positions would silently shift by one. The 6-month window
    // (and the dropped month after it) must be calendar-consecutive.
    let window = &aggregates[aggregates.len() - REQUIRED_MONTHS..];
    for pair in window.windows(2) {
        if pair[1].month != pair[0].month.next() {
            return Err(FeatureError::NonConsecutiveHistory {
                prev: pair[0].month,
                next: pair[1].month,
            });
        }
    }

    // Drop the trailing (possibly partial) month, keep the 6 before it.
    aggregates.pop();
    let start = aggregates.len() - crate::features::LAG_MONTHS;
    Ok(aggregates.split_off(start))
}
