//! Campaign and Global Settings
//!
//! Per-campaign anomaly sensitivity coefficients and the process-wide
//! notification settings, with validated partial updates. Both are created
//! lazily with defaults on first access by the repository.

mod global;
mod sensitivity;

pub use global::{GlobalSettings, GlobalSettingsRead, GlobalSettingsUpdate};
pub use sensitivity::{SensitivitySettings, SensitivityUpdate, DEFAULT_SENSITIVITY};

use campaign_core::Metric;
use thiserror::Error;

/// Settings errors
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// Sensitivity coefficient outside [0, 1]
    #[error("{metric} sensitivity {value} is out of range [0, 1]")]
    InvalidSensitivity { metric: Metric, value: f64 },

    /// Underlying store failure
    #[error("Settings store error: {0}")]
    Store(String),
}
