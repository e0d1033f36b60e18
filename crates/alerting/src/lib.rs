//! Alerting System
//!
//! The alert entity, its dedup key, the open/resolved/dismissed state
//! machine, and the store seam the lifecycle manager drives. At most one
//! open alert exists per (campaign, metric, trigger source); duplicate
//! triggers refresh the existing alert instead of creating a new one.

mod alert;
mod lifecycle;
mod store;

pub use alert::{Alert, AlertStatus, DedupKey, Disposition, TriggerCandidate, TriggerSource};
pub use lifecycle::{AlertLifecycle, SubmitOutcome};
pub use store::{AlertFilter, AlertStore, InsertOutcome, RefreshOutcome};

use campaign_core::Metric;
use thiserror::Error;
use uuid::Uuid;

/// Alert lifecycle errors
#[derive(Debug, Error)]
pub enum AlertError {
    /// No alert with this id
    #[error("Alert not found: {0}")]
    NotFound(Uuid),

    /// Transition attempted on an alert that already left the open state
    #[error("Alert {id} is already {status}")]
    AlreadyTerminal { id: Uuid, status: AlertStatus },

    /// Concurrent triggers for one dedup key could not be reconciled
    #[error("Unresolvable duplicate trigger race for campaign {campaign_id} metric {metric}")]
    DedupRace { campaign_id: Uuid, metric: Metric },

    /// Underlying store failure
    #[error("Alert store error: {0}")]
    Store(String),
}
