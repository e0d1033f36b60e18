//! Engine Errors

use alerting::AlertError;
use anomaly_detector::DetectorError;
use config::ConfigError;
use sample_validator::ValidationError;
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced by the alert engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Sample failed range validation; baselines were not advanced
    #[error("Invalid sample: {0}")]
    Validation(#[from] ValidationError),

    /// Sample rejected by the detector's ordering check
    #[error("Sample rejected: {0}")]
    Detector(#[from] DetectorError),

    /// Alert lifecycle or alert store failure
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    /// Repository failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration loading failure
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
