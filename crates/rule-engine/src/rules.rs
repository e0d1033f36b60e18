//! Alert Rule Types

use crate::RuleError;
use campaign_core::{Metric, Severity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comparison operator for threshold rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

impl RuleOperator {
    /// Parse a wire token (`lt`, `lte`, `gt`, `gte`, `eq`)
    pub fn parse(token: &str) -> Result<Self, RuleError> {
        match token {
            "lt" => Ok(RuleOperator::Lt),
            "lte" => Ok(RuleOperator::Lte),
            "gt" => Ok(RuleOperator::Gt),
            "gte" => Ok(RuleOperator::Gte),
            "eq" => Ok(RuleOperator::Eq),
            other => Err(RuleError::InvalidOperator {
                operator: other.to_string(),
            }),
        }
    }

    /// Get string representation (wire format)
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOperator::Lt => "lt",
            RuleOperator::Lte => "lte",
            RuleOperator::Gt => "gt",
            RuleOperator::Gte => "gte",
            RuleOperator::Eq => "eq",
        }
    }

    /// Apply the operator to an observed value and a threshold.
    ///
    /// `Eq` is exact floating-point equality, the stored contract for
    /// user-entered thresholds.
    pub fn apply(&self, value: f64, threshold: f64) -> bool {
        match self {
            RuleOperator::Lt => value < threshold,
            RuleOperator::Lte => value <= threshold,
            RuleOperator::Gt => value > threshold,
            RuleOperator::Gte => value >= threshold,
            RuleOperator::Eq => value == threshold,
        }
    }
}

impl std::fmt::Display for RuleOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-defined threshold rule, created and edited externally
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: Uuid,
    pub name: String,
    pub metric: Metric,
    /// Operator wire token; parsed on write and again at evaluation
    pub operator: String,
    pub threshold: f64,
    pub severity: Severity,
    pub enabled: bool,
    /// `None` applies the rule to every campaign
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
}

impl AlertRule {
    /// Parse the stored operator token
    pub fn parsed_operator(&self) -> Result<RuleOperator, RuleError> {
        RuleOperator::parse(&self.operator)
    }

    /// Validate the rule for a write (operator token must parse)
    pub fn validate(&self) -> Result<(), RuleError> {
        self.parsed_operator().map(|_| ())
    }

    /// Whether this rule is in scope for a campaign
    pub fn applies_to(&self, campaign_id: Uuid) -> bool {
        self.enabled && self.campaign_id.map_or(true, |id| id == campaign_id)
    }

    /// Message attached to alerts raised by this rule
    pub fn message(&self, value: f64) -> String {
        format!(
            "{}: {} is {:.2}, threshold {} {:.2}",
            self.name, self.metric, value, self.operator, self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse() {
        assert_eq!(RuleOperator::parse("lt").unwrap(), RuleOperator::Lt);
        assert_eq!(RuleOperator::parse("gte").unwrap(), RuleOperator::Gte);
        assert!(matches!(
            RuleOperator::parse("contains"),
            Err(RuleError::InvalidOperator { .. })
        ));
    }

    #[test]
    fn test_operator_apply() {
        assert!(RuleOperator::Lt.apply(0.9, 1.0));
        assert!(!RuleOperator::Lt.apply(1.0, 1.0));
        assert!(RuleOperator::Lte.apply(1.0, 1.0));
        assert!(RuleOperator::Gt.apply(1.5, 1.0));
        assert!(!RuleOperator::Gt.apply(1.0, 1.0));
        assert!(RuleOperator::Gte.apply(1.0, 1.0));
        assert!(RuleOperator::Eq.apply(1.0, 1.0));
        assert!(!RuleOperator::Eq.apply(1.0 + 1e-12, 1.0));
    }

    #[test]
    fn test_scoping() {
        let campaign = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut rule = AlertRule {
            id: Uuid::new_v4(),
            name: "High CPC".to_string(),
            metric: Metric::Cpc,
            operator: "gt".to_string(),
            threshold: 1.0,
            severity: Severity::Warning,
            enabled: true,
            campaign_id: None,
        };

        // Global rule applies everywhere
        assert!(rule.applies_to(campaign));
        assert!(rule.applies_to(other));

        rule.campaign_id = Some(campaign);
        assert!(rule.applies_to(campaign));
        assert!(!rule.applies_to(other));

        rule.enabled = false;
        assert!(!rule.applies_to(campaign));
    }

    #[test]
    fn test_rule_message() {
        let rule = AlertRule {
            id: Uuid::new_v4(),
            name: "Low ROAS Alert".to_string(),
            metric: Metric::Roas,
            operator: "lt".to_string(),
            threshold: 1.5,
            severity: Severity::Critical,
            enabled: true,
            campaign_id: None,
        };
        assert_eq!(
            rule.message(1.2),
            "Low ROAS Alert: roas is 1.20, threshold lt 1.50"
        );
    }
}
