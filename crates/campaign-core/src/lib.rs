//! Campaign Domain Types
//!
//! Shared vocabulary for the campaign alert pipeline: metrics, samples,
//! severities, the anomaly catalog, and the rolling window used for
//! per-campaign baselines.

mod anomaly;
mod types;
mod window;

pub use anomaly::{AdverseDirection, AnomalyType, SUGGESTED_ACTIONS};
pub use types::{Campaign, CampaignStatus, Metric, MetricSample, Severity};
pub use window::MetricWindow;
