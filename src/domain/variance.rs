//! Variance against baseline and the rounding rules shared by the engine.
//!
//! Rounding is half away from zero (`f64::round`). For the non-negative
//! amounts an allocation normally holds this is plain half-up rounding.

use std::fmt;

use serde::Serialize;

/// Round to the nearest whole amount.
pub fn round_whole(x: f64) -> f64 {
    x.round()
}

/// Round to two decimals (cents).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Percentage change of a value relative to its baseline, rounded to two decimals.
///
/// Displays with exactly two decimals, e.g. `25.00`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Variance(f64);

impl Variance {
    pub fn percent(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Variance of `value` against `baseline`; a zero baseline yields zero variance.
pub fn variance(value: f64, baseline: f64) -> Variance {
    if baseline == 0.0 {
        return Variance(0.0);
    }
    let pct = round2((value - baseline) / baseline * 100.0);
    // -0.0 would display as "-0.00"
    Variance(if pct == 0.0 { 0.0 } else { pct })
}
