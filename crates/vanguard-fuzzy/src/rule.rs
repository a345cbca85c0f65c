use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One antecedent atom: "`variable` is `label`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTerm {
    pub variable: String,
    pub label: String,
}

/// First-order TSK consequent: an affine function of the crisp inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    #[serde(default)]
    pub constant: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
}

impl Consequent {
    pub const fn constant(value: f64) -> Self {
        Self {
            constant: value,
            coefficients: BTreeMap::new(),
        }
    }
}

/// A single rule: conjunction of antecedent terms, a weight, and an affine
/// consequent contributing to one named output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TskRule {
    pub when: Vec<RuleTerm>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub output: String,
    pub then: Consequent,
}

fn default_weight() -> f64 {
    1.0
}

impl TskRule {
    pub fn new(when: Vec<(&str, &str)>, output: &str, then: Consequent) -> Self {
        Self {
            when: when
                .into_iter()
                .map(|(variable, label)| RuleTerm {
                    variable: variable.to_owned(),
                    label: label.to_owned(),
                })
                .collect(),
            weight: 1.0,
            output: output.to_owned(),
            then,
        }
    }
}
