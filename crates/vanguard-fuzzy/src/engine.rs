use std::collections::BTreeMap;

use crate::artifact::{RuleEvaluationError, RuleSet};

/// A validated TSK rule base ready for evaluation.
///
/// Evaluation is pure and takes `&self`; one engine is shared across all
/// agent sessions without locking.
#[derive(Debug, Clone)]
pub struct TskEngine {
    set: RuleSet,
}

impl TskEngine {
    pub fn new(set: RuleSet) -> Result<Self, RuleEvaluationError> {
        set.validate()?;
        Ok(Self { set })
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.set
    }

    /// Evaluate every declared output for the given crisp inputs.
    ///
    /// Inputs resolve by variable name and are clamped into the variable's
    /// domain first; a variable with no supplied reading evaluates at its
    /// domain midpoint. Firing strength is the minimum antecedent degree
    /// (Zadeh conjunction) scaled by the rule weight; outputs are the
    /// strength-weighted average of the consequents. When no rule fires for
    /// an output, its declared default is returned instead, so the result is
    /// always finite.
    pub fn evaluate(&self, inputs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        let crisp: BTreeMap<&str, f64> = self
            .set
            .variables
            .iter()
            .map(|(name, variable)| {
                let raw = inputs
                    .iter()
                    .find(|(input, _)| *input == name.as_str())
                    .map(|(_, value)| *value);
                let value = match raw {
                    Some(value) => variable.clamp(value),
                    None => variable.midpoint(),
                };
                (name.as_str(), value)
            })
            .collect();

        let mut weighted: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        for rule in &self.set.rules {
            let mut conjunction = 1.0_f64;
            for term in &rule.when {
                let degree = self
                    .set
                    .variables
                    .get(&term.variable)
                    .and_then(|variable| {
                        let x = crisp.get(term.variable.as_str())?;
                        Some(variable.terms.get(&term.label)?.degree(*x))
                    })
                    .unwrap_or(0.0);
                conjunction = conjunction.min(degree);
            }
            let strength = conjunction * rule.weight;
            if !(strength > 0.0) {
                continue;
            }

            let mut value = rule.then.constant;
            for (variable, coefficient) in &rule.then.coefficients {
                let x = crisp.get(variable.as_str()).copied().unwrap_or_else(|| {
                    self.set
                        .variables
                        .get(variable)
                        .map(|v| v.midpoint())
                        .unwrap_or(0.0)
                });
                value += coefficient * x;
            }

            let entry = weighted.entry(rule.output.as_str()).or_insert((0.0, 0.0));
            entry.0 += strength * value;
            entry.1 += strength;
        }

        self.set
            .defaults
            .iter()
            .map(|(output, default)| {
                let value = weighted
                    .get(output.as_str())
                    .filter(|(_, total)| *total > 0.0)
                    .map(|(sum, total)| sum / total)
                    .filter(|v| v.is_finite())
                    .unwrap_or(*default);
                (output.clone(), value)
            })
            .collect()
    }
}
