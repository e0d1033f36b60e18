//! Alert Lifecycle Manager

use crate::alert::{Alert, Disposition, TriggerCandidate};
use crate::store::{AlertStore, InsertOutcome, RefreshOutcome};
use crate::AlertError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of submitting a trigger
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// A new open alert was committed
    Created(Alert),
    /// An open alert for the same problem absorbed the trigger
    Deduplicated { existing: Alert },
}

impl SubmitOutcome {
    /// The alert this trigger ended up on
    pub fn alert(&self) -> &Alert {
        match self {
            SubmitOutcome::Created(alert) => alert,
            SubmitOutcome::Deduplicated { existing } => existing,
        }
    }

    /// Whether a new alert was created
    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_))
    }
}

/// Drives alert creation, deduplication, and terminal transitions against
/// the store's open-key uniqueness constraint.
pub struct AlertLifecycle {
    store: Arc<dyn AlertStore>,
}

impl AlertLifecycle {
    /// Create a lifecycle manager over a store
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Submit a trigger: refresh the open alert holding its dedup key, or
    /// create a new one.
    ///
    /// A lost insert race refreshes the first-committed alert instead
    /// (first-committed wins). If the winner leaves the open state before
    /// the refresh lands, the insert is retried once; a second conflict
    /// fails with `DedupRace` and the trigger is discarded.
    pub fn submit(&self, candidate: &TriggerCandidate) -> Result<SubmitOutcome, AlertError> {
        let key = candidate.dedup_key();

        if let Some(existing) = self.store.open_alert_for(&key)? {
            if let RefreshOutcome::Refreshed(alert) =
                self.store.refresh_value(existing.id, candidate.value)?
            {
                debug!(
                    alert_id = %alert.id,
                    campaign_id = %alert.campaign_id,
                    "Duplicate trigger absorbed, value refreshed to {}",
                    candidate.value
                );
                return Ok(SubmitOutcome::Deduplicated { existing: alert });
            }
            // The holder closed between lookup and refresh; create anew.
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.store.insert_open(candidate.to_alert(Utc::now()))? {
                InsertOutcome::Inserted(alert) => {
                    info!(
                        alert_id = %alert.id,
                        campaign_id = %alert.campaign_id,
                        severity = %alert.severity,
                        metric = %alert.metric,
                        "Alert created: {}",
                        alert.message
                    );
                    return Ok(SubmitOutcome::Created(alert));
                }
                InsertOutcome::RacedOpen(existing) => {
                    warn!(
                        alert_id = %existing.id,
                        campaign_id = %existing.campaign_id,
                        "Concurrent trigger lost the insert race, keeping first-committed alert"
                    );
                    match self.store.refresh_value(existing.id, candidate.value)? {
                        RefreshOutcome::Refreshed(alert) => {
                            return Ok(SubmitOutcome::Deduplicated { existing: alert });
                        }
                        RefreshOutcome::NoLongerOpen(_) if attempts < 2 => {
                            // Winner closed before our refresh; insert again.
                            continue;
                        }
                        RefreshOutcome::NoLongerOpen(_) => {
                            return Err(AlertError::DedupRace {
                                campaign_id: candidate.campaign_id,
                                metric: candidate.metric,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Apply a terminal transition to an alert
    pub fn transition(
        &self,
        alert_id: Uuid,
        disposition: Disposition,
        resolved_by: Option<String>,
    ) -> Result<Alert, AlertError> {
        let alert = self
            .store
            .apply_transition(alert_id, disposition, resolved_by, Utc::now())?;
        info!(alert_id = %alert.id, status = %alert.status, "Alert {}", alert.status);
        Ok(alert)
    }
}
