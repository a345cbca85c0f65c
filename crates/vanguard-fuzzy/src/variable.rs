use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::membership::Membership;

/// A linguistic input variable: a closed crisp domain plus labeled terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyVariable {
    pub lo: f64,
    pub hi: f64,
    pub terms: BTreeMap<String, Membership>,
}

impl FuzzyVariable {
    /// Pull a crisp reading into the variable's domain. Non-numeric input
    /// reads as the lower bound.
    pub fn clamp(&self, x: f64) -> f64 {
        if x.is_nan() {
            self.lo
        } else {
            x.clamp(self.lo, self.hi)
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.lo + (self.hi - self.lo) * 0.5
    }
}
