//! Alert Notifications
//!
//! Fans newly created alerts out to the enabled notification channels.
//! Channel settings are read fresh at dispatch time; a failing channel is
//! logged and reported but never blocks the other channels or the alert
//! itself. Nothing here retries.

mod delivery;
mod dispatcher;
mod payload;

pub use delivery::{LogDelivery, NotificationDelivery};
pub use dispatcher::{ChannelOutcome, DispatchReport, NotificationDispatcher};
pub use payload::{Channel, NotificationPayload};

use thiserror::Error;

/// Channel delivery errors
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The transport reported a failure
    #[error("{channel} delivery failed: {reason}")]
    Failed { channel: Channel, reason: String },

    /// The channel is enabled but its address/webhook is missing
    #[error("{channel} is enabled but not configured")]
    NotConfigured { channel: Channel },
}
