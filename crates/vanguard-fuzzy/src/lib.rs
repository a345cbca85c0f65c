//! Takagi-Sugeno-Kang fuzzy inference over validated rule artifacts.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod builtin;
pub mod engine;
pub mod membership;
pub mod rule;
pub mod variable;

pub use artifact::{RuleEvaluationError, RuleSet};
pub use engine::TskEngine;
pub use membership::Membership;
pub use rule::{Consequent, RuleTerm, TskRule};
pub use variable::FuzzyVariable;
