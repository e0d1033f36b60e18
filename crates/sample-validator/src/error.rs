//! Validation Error Types

use campaign_core::Metric;
use thiserror::Error;

/// Errors during sample validation
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{metric} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        metric: Metric,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value is NaN or infinite
    #[error("{metric} value {value} is not finite")]
    NotFinite { metric: Metric, value: f64 },
}
