//! Notification Payload

use alerting::Alert;
use campaign_core::{Metric, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    InApp,
    Email,
    Slack,
}

impl Channel {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::InApp => "inApp",
            Channel::Email => "email",
            Channel::Slack => "slack",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized payload sent to every channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub campaign_id: Uuid,
    pub severity: Severity,
    pub metric: Metric,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
}

impl NotificationPayload {
    /// Build the payload for a newly created alert
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            campaign_id: alert.campaign_id,
            severity: alert.severity,
            metric: alert.metric,
            message: alert.message.clone(),
            value: alert.value,
            threshold: alert.threshold,
            created_at: alert.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{AlertStatus, TriggerSource};
    use campaign_core::AnomalyType;

    #[test]
    fn test_payload_mirrors_alert() {
        let alert = Alert {
            id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            metric: Metric::Cpc,
            source: TriggerSource::Anomaly(AnomalyType::CpcHigh),
            severity: Severity::Warning,
            status: AlertStatus::Open,
            value: 1.5,
            threshold: 0.9,
            message: "CPC increased to $1.50".to_string(),
            suggestions: None,
            created_at: Utc::now(),
            resolved_at: None,
            resolved_by: None,
            dismissed_at: None,
        };

        let payload = NotificationPayload::from_alert(&alert);
        assert_eq!(payload.campaign_id, alert.campaign_id);
        assert_eq!(payload.metric, Metric::Cpc);
        assert_eq!(payload.severity, Severity::Warning);
        assert_eq!(payload.message, alert.message);
        assert_eq!(payload.value, 1.5);
        assert_eq!(payload.threshold, 0.9);
        assert_eq!(payload.created_at, alert.created_at);
    }
}
