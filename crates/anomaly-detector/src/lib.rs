//! Anomaly Detection
//!
//! Compares each metric sample against a per-campaign rolling baseline and
//! flags directional deviations that exceed the sensitivity-derived
//! threshold. Baselines are campaign- and metric-local; samples must arrive
//! in non-decreasing timestamp order per campaign.

mod baseline;
mod detector;

pub use baseline::CampaignBaseline;
pub use detector::{AnomalyDetector, AnomalySignal, DetectorConfig};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Detection errors
#[derive(Debug, Clone, Error)]
pub enum DetectorError {
    /// Sample older than the newest accepted sample for the campaign
    #[error(
        "Out-of-order sample for campaign {campaign_id}: {timestamp} is before {last_seen}"
    )]
    OutOfOrderSample {
        campaign_id: Uuid,
        last_seen: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
}
