//! Rule Evaluation

use crate::rules::AlertRule;
use campaign_core::MetricSample;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// A rule that matched a sample
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule: AlertRule,
    /// Observed value of the rule's metric
    pub value: f64,
}

/// A rule skipped because its stored operator no longer parses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRule {
    pub rule_id: Uuid,
    pub operator: String,
}

/// Outcome of evaluating the rule set against one sample
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluation {
    pub matches: Vec<RuleMatch>,
    pub skipped: Vec<SkippedRule>,
}

/// Evaluate every applicable rule against one sample.
///
/// Disabled and out-of-scope rules are ignored; rules with an invalid
/// operator are reported in `skipped` and never fail the sample.
pub fn evaluate(sample: &MetricSample, rules: &[AlertRule]) -> RuleEvaluation {
    let mut evaluation = RuleEvaluation::default();

    for rule in rules {
        if !rule.applies_to(sample.campaign_id) {
            continue;
        }

        let operator = match rule.parsed_operator() {
            Ok(op) => op,
            Err(e) => {
                warn!(rule_id = %rule.id, "Skipping rule: {}", e);
                evaluation.skipped.push(SkippedRule {
                    rule_id: rule.id,
                    operator: rule.operator.clone(),
                });
                continue;
            }
        };

        let value = sample.value(rule.metric);
        if operator.apply(value, rule.threshold) {
            evaluation.matches.push(RuleMatch {
                rule: rule.clone(),
                value,
            });
        }
    }

    evaluation
}
