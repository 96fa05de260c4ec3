use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;

/// Sentinel the historical data source uses for "no reading".
/// Must be treated as absent, never as a numeric value.
pub const SENTINEL: f64 = -999.0;

/// The four climate variables the gateway aggregates and predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// Temperature at 2 meters (celsius)
    T2m,
    /// Relative humidity at 2 meters (percent)
    Rh2m,
    /// Wind speed at 2 meters (m/s)
    Ws2m,
    /// Surface pressure (kPa)
    Ps,
}

impl Variable {
    /// All variables, in the order the feature schema and the upstream
    /// request parameter list use them.
    pub const ALL: [Variable; 4] = [Variable::T2m, Variable::Rh2m, Variable::Ws2m, Variable::Ps];

    /// The upstream code for this variable (as it appears in payloads,
    /// feature names and model artifact filenames).
    pub fn code(&self) -> &'static str {
        match self {
            Variable::T2m => "T2M",
            Variable::Rh2m => "RH2M",
            Variable::Ws2m => "WS2M",
            Variable::Ps => "PS",
        }
    }

    /// Parse an upstream variable code. Unknown codes return `None` so
    /// extra payload parameters can be skipped rather than rejected.
    pub fn from_code(code: &str) -> Option<Variable> {
        match code {
            "T2M" => Some(Variable::T2m),
            "RH2M" => Some(Variable::Rh2m),
            "WS2M" => Some(Variable::Ws2m),
            "PS" => Some(Variable::Ps),
            _ => None,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One historical sample: an hour-resolution timestamp plus whatever
/// variables the source reported for that hour. Sentinel readings are kept
/// here as-is; the normalizer is responsible for excluding them.
#[derive(Debug, Clone)]
pub struct RawObservation {
    pub timestamp: NaiveDateTime,
    pub values: HashMap<Variable, f64>,
}
