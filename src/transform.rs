//! Presentation boost applied to raw model probabilities.
//!
//! The model output is scaled by a multiplier that grows linearly with age
//! above 50 and weight above 80 kg, then capped at 1.0:
//!
//! ```text
//! m = 1 + max(age - 50, 0) × 0.02 + max(weight - 80, 0) × 0.015
//! boosted = min(p × m, 1)
//! ```
//!
//! Everything here is pure and synchronous so it can be tested without any
//! network in the loop.

use serde::{Deserialize, Serialize};

use crate::consts::{
    AGE_BOOST_PER_YEAR, AGE_BOOST_THRESHOLD, WEIGHT_BOOST_PER_KG, WEIGHT_BOOST_THRESHOLD,
};

/// Piecewise-linear boost curve over age and weight.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BoostCurve {
    /// Age above which the multiplier grows
    #[serde(default = "default_age_threshold")]
    pub age_threshold: f64,
    /// Multiplier added per year above `age_threshold`
    #[serde(default = "default_age_slope")]
    pub age_slope: f64,
    /// Weight (kg) above which the multiplier grows
    #[serde(default = "default_weight_threshold")]
    pub weight_threshold: f64,
    /// Multiplier added per kg above `weight_threshold`
    #[serde(default = "default_weight_slope")]
    pub weight_slope: f64,
}

fn default_age_threshold() -> f64 {
    AGE_BOOST_THRESHOLD
}
fn default_age_slope() -> f64 {
    AGE_BOOST_PER_YEAR
}
fn default_weight_threshold() -> f64 {
    WEIGHT_BOOST_THRESHOLD
}
fn default_weight_slope() -> f64 {
    WEIGHT_BOOST_PER_KG
}

impl Default for BoostCurve {
    fn default() -> Self {
        Self {
            age_threshold: default_age_threshold(),
            age_slope: default_age_slope(),
            weight_threshold: default_weight_threshold(),
            weight_slope: default_weight_slope(),
        }
    }
}

impl BoostCurve {
    /// Multiplier for the given age and weight. Never below 1.0; unbounded
    /// above, so `+inf` inputs yield an infinite multiplier.
    pub fn multiplier(&self, age: f64, weight: f64) -> f64 {
        let mut m = 1.0;
        // NaN compares false and falls through
        if age > self.age_threshold {
            m += (age - self.age_threshold) * self.age_slope.max(0.0);
        }
        if weight > self.weight_threshold {
            m += (weight - self.weight_threshold) * self.weight_slope.max(0.0);
        }
        m
    }

    /// Boosted probability, always in `[0, 1]`.
    pub fn apply(&self, probability: f64, age: f64, weight: f64) -> f64 {
        if !probability.is_finite() {
            return 0.0;
        }
        let p = probability.clamp(0.0, 1.0);
        // 0 × inf is NaN, and f64::min would turn that into 1.0
        if p == 0.0 {
            return 0.0;
        }
        (p * self.multiplier(age, weight)).min(1.0)
    }
}

/// Boost `probability` with the default curve.
pub fn boost(probability: f64, age: f64, weight: f64) -> f64 {
    BoostCurve::default().apply(probability, age, weight)
}
