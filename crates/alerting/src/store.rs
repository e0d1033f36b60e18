//! Alert Store Seam

use crate::alert::{Alert, AlertStatus, DedupKey, Disposition};
use crate::AlertError;
use campaign_core::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of an open-alert insert
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The alert was committed as the open alert for its dedup key
    Inserted(Alert),
    /// Another open alert already held the key; the insert was not applied
    RacedOpen(Alert),
}

/// Outcome of refreshing an open alert's observed value
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The open alert's value was updated
    Refreshed(Alert),
    /// The alert left the open state first; nothing was written
    NoLongerOpen(Alert),
}

/// Query filter for the alert feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertFilter {
    pub campaign_id: Option<Uuid>,
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
}

impl AlertFilter {
    /// Whether an alert passes this filter
    pub fn matches(&self, alert: &Alert) -> bool {
        self.campaign_id.map_or(true, |id| alert.campaign_id == id)
            && self.severity.map_or(true, |s| alert.severity == s)
            && self.status.map_or(true, |s| alert.status == s)
    }
}

/// Persistence seam for alerts.
///
/// The store owns the open-key uniqueness constraint: `insert_open` must
/// atomically check for an existing open alert with the same dedup key and
/// either commit the new alert or report the holder. `apply_transition`
/// must check-and-write the status under the same guard.
pub trait AlertStore: Send + Sync {
    /// The open alert holding a dedup key, if any
    fn open_alert_for(&self, key: &DedupKey) -> Result<Option<Alert>, AlertError>;

    /// Atomically insert an open alert unless its key is already held
    fn insert_open(&self, alert: Alert) -> Result<InsertOutcome, AlertError>;

    /// Update the observed value of a still-open alert
    fn refresh_value(&self, alert_id: Uuid, value: f64) -> Result<RefreshOutcome, AlertError>;

    /// Atomically apply a terminal transition
    fn apply_transition(
        &self,
        alert_id: Uuid,
        disposition: Disposition,
        resolved_by: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Alert, AlertError>;

    /// Fetch one alert by id
    fn alert(&self, alert_id: Uuid) -> Result<Option<Alert>, AlertError>;

    /// Alerts passing the filter, newest first
    fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertError>;

    /// All open alerts for one campaign
    fn open_alerts(&self, campaign_id: Uuid) -> Result<Vec<Alert>, AlertError>;
}
