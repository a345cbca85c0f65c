use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rule::TskRule;
use crate::variable::FuzzyVariable;

/// A malformed rule base. Raised when an artifact is loaded or a rule set is
/// handed to the engine; never during evaluation.
#[derive(Debug, Error)]
pub enum RuleEvaluationError {
    #[error("failed to read rule artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rule artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("variable {name:?} has an empty or non-finite domain [{lo}, {hi}]")]
    BadDomain { name: String, lo: f64, hi: f64 },
    #[error("variable {name:?} declares no terms")]
    NoTerms { name: String },
    #[error("membership points for {variable:?}/{label:?} must be finite and in ascending order")]
    BadShape { variable: String, label: String },
    #[error("rule #{index} references undeclared variable {variable:?}")]
    UnknownVariable { index: usize, variable: String },
    #[error("rule #{index} references {variable:?} term {label:?}, which is not declared")]
    UnknownLabel {
        index: usize,
        variable: String,
        label: String,
    },
    #[error("rule #{index} weight must be finite and >= 0, got {weight}")]
    BadWeight { index: usize, weight: f64 },
    #[error("rule #{index} consequent has a non-finite term")]
    BadConsequent { index: usize },
    #[error("rule #{index} feeds output {output:?}, which has no declared default")]
    UnknownOutput { index: usize, output: String },
    #[error("rule base does not declare required output {output:?}")]
    MissingOutput { output: String },
    #[error("default for output {output:?} must be finite, got {value}")]
    BadDefault { output: String, value: f64 },
}

/// A complete rule base: input variables, rules, and per-output defaults.
///
/// The `defaults` map doubles as the output declaration; every rule must feed
/// a declared output, and [`crate::TskEngine::new`] refuses unvalidated sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub variables: BTreeMap<String, FuzzyVariable>,
    pub rules: Vec<TskRule>,
    pub defaults: BTreeMap<String, f64>,
}

impl RuleSet {
    pub fn from_json(json: &str) -> Result<Self, RuleEvaluationError> {
        let set: RuleSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self, RuleEvaluationError> {
        let json = std::fs::read_to_string(path).map_err(|source| RuleEvaluationError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Structural validation. A set that passes evaluates totally: every
    /// in-domain input produces a finite value for every declared output.
    pub fn validate(&self) -> Result<(), RuleEvaluationError> {
        for (name, variable) in &self.variables {
            if !variable.lo.is_finite() || !variable.hi.is_finite() || variable.lo >= variable.hi {
                return Err(RuleEvaluationError::BadDomain {
                    name: name.clone(),
                    lo: variable.lo,
                    hi: variable.hi,
                });
            }
            if variable.terms.is_empty() {
                return Err(RuleEvaluationError::NoTerms { name: name.clone() });
            }
            for (label, shape) in &variable.terms {
                if !shape.is_well_formed() {
                    return Err(RuleEvaluationError::BadShape {
                        variable: name.clone(),
                        label: label.clone(),
                    });
                }
            }
        }

        for (output, value) in &self.defaults {
            if !value.is_finite() {
                return Err(RuleEvaluationError::BadDefault {
                    output: output.clone(),
                    value: *value,
                });
            }
        }

        for (index, rule) in self.rules.iter().enumerate() {
            for term in &rule.when {
                let Some(variable) = self.variables.get(&term.variable) else {
                    return Err(RuleEvaluationError::UnknownVariable {
                        index,
                        variable: term.variable.clone(),
                    });
                };
                if !variable.terms.contains_key(&term.label) {
                    return Err(RuleEvaluationError::UnknownLabel {
                        index,
                        variable: term.variable.clone(),
                        label: term.label.clone(),
                    });
                }
            }
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                return Err(RuleEvaluationError::BadWeight {
                    index,
                    weight: rule.weight,
                });
            }
            let consequent_finite = rule.then.constant.is_finite()
                && rule.then.coefficients.values().all(|c| c.is_finite());
            if !consequent_finite {
                return Err(RuleEvaluationError::BadConsequent { index });
            }
            if !self.defaults.contains_key(&rule.output) {
                return Err(RuleEvaluationError::UnknownOutput {
                    index,
                    output: rule.output.clone(),
                });
            }
        }

        Ok(())
    }
}
