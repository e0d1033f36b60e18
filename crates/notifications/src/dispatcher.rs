//! Notification Dispatcher

use crate::delivery::NotificationDelivery;
use crate::payload::{Channel, NotificationPayload};
use crate::DeliveryError;
use alerting::Alert;
use serde::Serialize;
use settings::{GlobalSettingsRead, SettingsError};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of one channel attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelOutcome {
    fn delivered(channel: Channel) -> Self {
        Self {
            channel,
            delivered: true,
            error: None,
        }
    }

    fn failed(channel: Channel, error: &DeliveryError) -> Self {
        Self {
            channel,
            delivered: false,
            error: Some(error.to_string()),
        }
    }
}

/// Per-channel outcomes for one dispatched alert.
///
/// Disabled channels are absent; an enabled channel always contributes an
/// outcome, delivered or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub alert_id: Uuid,
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// Channels that accepted the notification
    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.delivered).count()
    }

    /// Outcome for one channel, if it was enabled
    pub fn outcome(&self, channel: Channel) -> Option<&ChannelOutcome> {
        self.outcomes.iter().find(|o| o.channel == channel)
    }
}

/// Fans a new alert out to every enabled channel.
///
/// Global settings are read through the seam on every dispatch, so channel
/// toggles take effect on the next alert without restarts.
pub struct NotificationDispatcher {
    settings: Arc<dyn GlobalSettingsRead>,
    delivery: Arc<dyn NotificationDelivery>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over a settings source and a delivery transport
    pub fn new(
        settings: Arc<dyn GlobalSettingsRead>,
        delivery: Arc<dyn NotificationDelivery>,
    ) -> Self {
        Self { settings, delivery }
    }

    /// Dispatch one newly created alert.
    ///
    /// Only a settings read failure is an error; per-channel failures are
    /// logged and reported in the returned `DispatchReport`.
    pub async fn dispatch(&self, alert: &Alert) -> Result<DispatchReport, SettingsError> {
        let settings = self.settings.global_settings()?;
        let payload = NotificationPayload::from_alert(alert);
        let mut outcomes = Vec::new();

        if settings.in_app_enabled {
            let result = self.delivery.send_in_app(&payload).await;
            outcomes.push(self.record(alert.id, Channel::InApp, result));
        }

        if settings.email_enabled {
            let result = match settings.email_address.as_deref() {
                Some(address) => self.delivery.send_email(address, &payload).await,
                None => Err(DeliveryError::NotConfigured {
                    channel: Channel::Email,
                }),
            };
            outcomes.push(self.record(alert.id, Channel::Email, result));
        }

        if settings.slack_enabled {
            let result = match settings.slack_webhook.as_deref() {
                Some(webhook) => self.delivery.send_slack(webhook, &payload).await,
                None => Err(DeliveryError::NotConfigured {
                    channel: Channel::Slack,
                }),
            };
            outcomes.push(self.record(alert.id, Channel::Slack, result));
        }

        debug!(
            alert_id = %alert.id,
            attempted = outcomes.len(),
            delivered = outcomes.iter().filter(|o| o.delivered).count(),
            "Notification dispatch finished"
        );

        Ok(DispatchReport {
            alert_id: alert.id,
            outcomes,
        })
    }

    fn record(
        &self,
        alert_id: Uuid,
        channel: Channel,
        result: Result<(), DeliveryError>,
    ) -> ChannelOutcome {
        match result {
            Ok(()) => ChannelOutcome::delivered(channel),
            Err(e) => {
                warn!(alert_id = %alert_id, channel = %channel, "Notification delivery failed: {}", e);
                ChannelOutcome::failed(channel, &e)
            }
        }
    }
}
