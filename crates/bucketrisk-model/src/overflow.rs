//! # Overflow-Risk Evaluator
//!
//! Upper-bounds `P(load at depth d > Z)` from the expected load with the
//! multiplicative Chernoff bound:
//!
//! ```text
//! delta = Z / E[d] − 1
//! P[d]  = exp( −(delta² / (2 + delta)) · E[d] )
//! ```
//!
//! The bound only holds for `delta > 0`. Two inputs fall outside it:
//!
//! | Input | Regime | Reported probability |
//! |---|---|---|
//! | `E[d] = 0` | [`OverflowRegime::ZeroLoad`] | exactly 0 |
//! | `E[d] ≥ Z` | [`OverflowRegime::Saturated`] | exactly 1 (or raw formula under [`TailPolicy::Literal`]) |
//!
//! Depths are evaluated independently.

use serde::{Deserialize, Serialize};

use crate::params::TailPolicy;

/// Which branch of the evaluator produced a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowRegime {
    /// No expected load; no overflow risk.
    ZeroLoad,
    /// Expected load below capacity; Chernoff bound applied.
    Bounded,
    /// Expected load at or above capacity; bound not applicable.
    Saturated,
}

impl OverflowRegime {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZeroLoad => "zero_load",
            Self::Bounded => "bounded",
            Self::Saturated => "saturated",
        }
    }
}

/// Probability and the regime it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverflowEstimate {
    pub probability: f64,
    pub regime: OverflowRegime,
}

/// Chernoff exponent `(delta² / (2 + delta)) · E`.
///
/// Substituting `delta = (Z − E) / E` gives `(Z − E)² / (Z + E)`, which stays
/// finite when `E` is tiny and `delta²` would overflow.
fn chernoff_exponent(capacity: f64, expected_load: f64) -> f64 {
    let gap = capacity - expected_load;
    gap * gap / (capacity + expected_load)
}

/// Overflow probability of a bucket with the given capacity and expected load.
#[must_use]
pub fn overflow_probability(
    capacity: u64,
    expected_load: f64,
    policy: TailPolicy,
) -> OverflowEstimate {
    if expected_load <= 0.0 {
        return OverflowEstimate {
            probability: 0.0,
            regime: OverflowRegime::ZeroLoad,
        };
    }

    let capacity = capacity as f64;
    // delta = Z / E - 1 <= 0
    if expected_load >= capacity {
        let probability = if policy.clamps_saturation() {
            1.0
        } else {
            (-chernoff_exponent(capacity, expected_load)).exp()
        };
        return OverflowEstimate {
            probability,
            regime: OverflowRegime::Saturated,
        };
    }

    OverflowEstimate {
        probability: (-chernoff_exponent(capacity, expected_load)).exp(),
        regime: OverflowRegime::Bounded,
    }
}
