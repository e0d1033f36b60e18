//! Alert Rule Engine
//!
//! Evaluates user-defined static threshold rules against metric samples.
//! Rules are stored with their operator as the wire token and parsed
//! defensively at evaluation time; a rule with an unknown operator is
//! skipped, never fatal to the sample.

mod evaluator;
mod rules;

pub use evaluator::{evaluate, RuleEvaluation, RuleMatch, SkippedRule};
pub use rules::{AlertRule, RuleOperator};

use thiserror::Error;

/// Rule errors
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// Operator token is not one of lt, lte, gt, gte, eq
    #[error("Invalid rule operator: {operator}")]
    InvalidOperator { operator: String },
}
