//! Delivery Collaborator

use crate::payload::NotificationPayload;
use crate::DeliveryError;
use campaign_core::Severity;
use tracing::{error, info, warn};

/// External delivery mechanics, one method per channel.
///
/// Implementations are best-effort transports; each send is independently
/// failable and the dispatcher never retries.
#[async_trait::async_trait]
pub trait NotificationDelivery: Send + Sync {
    /// Deliver an in-app notification
    async fn send_in_app(&self, payload: &NotificationPayload) -> Result<(), DeliveryError>;

    /// Deliver an email notification to the configured address
    async fn send_email(
        &self,
        address: &str,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError>;

    /// Post the notification to the configured Slack webhook
    async fn send_slack(
        &self,
        webhook_url: &str,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError>;
}

/// Tracing-backed delivery used until a real transport is wired in.
/// Always succeeds.
#[derive(Debug, Clone, Default)]
pub struct LogDelivery;

impl LogDelivery {
    pub fn new() -> Self {
        Self
    }

    fn log(&self, channel: &str, payload: &NotificationPayload) {
        match payload.severity {
            Severity::Info => info!(
                channel,
                campaign_id = %payload.campaign_id,
                metric = %payload.metric,
                "[NOTIFY] {}",
                payload.message
            ),
            Severity::Warning => warn!(
                channel,
                campaign_id = %payload.campaign_id,
                metric = %payload.metric,
                "[NOTIFY] {}",
                payload.message
            ),
            Severity::Critical => error!(
                channel,
                campaign_id = %payload.campaign_id,
                metric = %payload.metric,
                "[NOTIFY] {}",
                payload.message
            ),
        }
    }
}

#[async_trait::async_trait]
impl NotificationDelivery for LogDelivery {
    async fn send_in_app(&self, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        self.log("inApp", payload);
        Ok(())
    }

    async fn send_email(
        &self,
        address: &str,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        info!(address, "Email notification queued");
        self.log("email", payload);
        Ok(())
    }

    async fn send_slack(
        &self,
        webhook_url: &str,
        payload: &NotificationPayload,
    ) -> Result<(), DeliveryError> {
        info!(webhook_url, "Slack notification queued");
        self.log("slack", payload);
        Ok(())
    }
}
