//! Fuzzy command controllers and turret command composition.

pub mod firing;
pub mod movement;
pub mod turret;

pub use firing::{FireCommand, FiringController};
pub use movement::MovementController;

use vanguard_fuzzy::{RuleEvaluationError, TskEngine};

/// A controller reads its outputs by name; a rule base that does not
/// declare all of them must be rejected before the first tick.
fn require_outputs(engine: &TskEngine, outputs: &[&str]) -> Result<(), RuleEvaluationError> {
    for output in outputs {
        if !engine.rule_set().defaults.contains_key(*output) {
            return Err(RuleEvaluationError::MissingOutput {
                output: (*output).to_string(),
            });
        }
    }
    Ok(())
}
