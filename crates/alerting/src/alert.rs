//! Alert Entity and State Machine

use crate::AlertError;
use campaign_core::{AnomalyType, Metric, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    /// Get string representation (wire format)
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "open",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Dismissed => "dismissed",
        }
    }

    /// Resolved and dismissed are terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AlertStatus::Open)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Resolved,
    Dismissed,
}

/// What raised an alert: the anomaly detector or a user-defined rule.
///
/// Serializes into the alert body as either an `anomalyType` or a `ruleId`
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerSource {
    #[serde(rename = "anomalyType")]
    Anomaly(AnomalyType),
    #[serde(rename = "ruleId")]
    Rule(Uuid),
}

/// Key identifying "the same underlying problem" for deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub campaign_id: Uuid,
    pub metric: Metric,
    pub source: TriggerSource,
}

/// A mutable alert raised for a campaign.
///
/// Created only by the lifecycle manager; `status` leaves `Open` exactly
/// once, through [`Alert::apply_transition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub metric: Metric,
    #[serde(flatten)]
    pub source: TriggerSource,
    pub severity: Severity,
    pub status: AlertStatus,
    /// Latest observed value of the metric (refreshed on duplicate triggers)
    pub value: f64,
    /// Threshold the value crossed
    pub threshold: f64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Dedup key for this alert
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            campaign_id: self.campaign_id,
            metric: self.metric,
            source: self.source,
        }
    }

    /// Whether the alert is still open
    pub fn is_open(&self) -> bool {
        self.status == AlertStatus::Open
    }

    /// Apply a terminal transition.
    ///
    /// `Resolved` records `resolved_at` and `resolved_by` (defaulting to
    /// `"system"`); `Dismissed` records `dismissed_at`. Fails with
    /// `AlreadyTerminal` if the alert has already left `Open` — transitions
    /// are one-way and not idempotent.
    pub fn apply_transition(
        &mut self,
        disposition: Disposition,
        resolved_by: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AlertError> {
        if self.status.is_terminal() {
            return Err(AlertError::AlreadyTerminal {
                id: self.id,
                status: self.status,
            });
        }
        match disposition {
            Disposition::Resolved => {
                self.status = AlertStatus::Resolved;
                self.resolved_at = Some(at);
                self.resolved_by = Some(resolved_by.unwrap_or_else(|| "system".to_string()));
            }
            Disposition::Dismissed => {
                self.status = AlertStatus::Dismissed;
                self.dismissed_at = Some(at);
            }
        }
        Ok(())
    }
}

/// A trigger produced by the detector or the rule engine, not yet
/// deduplicated against the open alerts
#[derive(Debug, Clone)]
pub struct TriggerCandidate {
    pub campaign_id: Uuid,
    pub metric: Metric,
    pub source: TriggerSource,
    pub severity: Severity,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    pub suggestions: Option<Vec<String>>,
}

impl TriggerCandidate {
    /// Dedup key for this trigger
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            campaign_id: self.campaign_id,
            metric: self.metric,
            source: self.source,
        }
    }

    /// Materialize a fresh open alert from this trigger
    pub fn to_alert(&self, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            campaign_id: self.campaign_id,
            metric: self.metric,
            source: self.source,
            severity: self.severity,
            status: AlertStatus::Open,
            value: self.value,
            threshold: self.threshold,
            message: self.message.clone(),
            suggestions: self.suggestions.clone(),
            created_at,
            resolved_at: None,
            resolved_by: None,
            dismissed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> TriggerCandidate {
        TriggerCandidate {
            campaign_id: Uuid::new_v4(),
            metric: Metric::Roas,
            source: TriggerSource::Anomaly(AnomalyType::RoasLow),
            severity: Severity::Critical,
            value: 1.2,
            threshold: 2.1,
            message: "ROAS dropped to 1.20x".to_string(),
            suggestions: Some(vec!["Review targeting parameters".to_string()]),
        }
    }

    #[test]
    fn test_new_alert_is_open() {
        let alert = candidate().to_alert(Utc::now());
        assert!(alert.is_open());
        assert!(alert.resolved_at.is_none());
        assert!(alert.resolved_by.is_none());
        assert!(alert.dismissed_at.is_none());
    }

    #[test]
    fn test_resolve_sets_fields() {
        let mut alert = candidate().to_alert(Utc::now());
        let at = Utc::now();

        alert
            .apply_transition(Disposition::Resolved, Some("alice".to_string()), at)
            .unwrap();

        assert_eq!(alert.status, AlertStatus::Resolved);
        assert_eq!(alert.resolved_at, Some(at));
        assert_eq!(alert.resolved_by.as_deref(), Some("alice"));
        assert!(alert.dismissed_at.is_none());
    }

    #[test]
    fn test_resolve_defaults_to_system() {
        let mut alert = candidate().to_alert(Utc::now());
        alert
            .apply_transition(Disposition::Resolved, None, Utc::now())
            .unwrap();
        assert_eq!(alert.resolved_by.as_deref(), Some("system"));
    }

    #[test]
    fn test_dismiss_sets_dismissed_at_only() {
        let mut alert = candidate().to_alert(Utc::now());
        let at = Utc::now();
        alert
            .apply_transition(Disposition::Dismissed, None, at)
            .unwrap();

        assert_eq!(alert.status, AlertStatus::Dismissed);
        assert_eq!(alert.dismissed_at, Some(at));
        assert!(alert.resolved_at.is_none());
        assert!(alert.resolved_by.is_none());
    }

    #[test]
    fn test_second_transition_fails() {
        let mut alert = candidate().to_alert(Utc::now());
        alert
            .apply_transition(Disposition::Resolved, None, Utc::now())
            .unwrap();

        let err = alert
            .apply_transition(Disposition::Resolved, None, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            AlertError::AlreadyTerminal {
                status: AlertStatus::Resolved,
                ..
            }
        ));

        // Dismiss after resolve is equally rejected
        assert!(alert
            .apply_transition(Disposition::Dismissed, None, Utc::now())
            .is_err());
    }

    #[test]
    fn test_dedup_key_distinguishes_sources() {
        let campaign_id = Uuid::new_v4();
        let mut anomaly = candidate();
        anomaly.campaign_id = campaign_id;
        let mut rule = candidate();
        rule.campaign_id = campaign_id;
        rule.source = TriggerSource::Rule(Uuid::new_v4());

        assert_ne!(anomaly.dedup_key(), rule.dedup_key());
        assert_eq!(anomaly.dedup_key(), anomaly.to_alert(Utc::now()).dedup_key());
    }

    #[test]
    fn test_wire_format_flattens_source() {
        let alert = candidate().to_alert(Utc::now());
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json.get("anomalyType").unwrap(), "roas_low");
        assert!(json.get("ruleId").is_none());
        assert_eq!(json.get("status").unwrap(), "open");
        assert!(json.get("resolvedAt").is_none());

        let rule_id = Uuid::new_v4();
        let mut rule_alert = candidate().to_alert(Utc::now());
        rule_alert.source = TriggerSource::Rule(rule_id);
        let json = serde_json::to_value(&rule_alert).unwrap();
        assert_eq!(json.get("ruleId").unwrap(), &rule_id.to_string());
        assert!(json.get("anomalyType").is_none());
    }
}
