//! Metric Sample Validator

use crate::error::ValidationError;
use campaign_core::{Metric, MetricSample};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// CTR valid range (%)
    pub ctr_range: (f64, f64),
    /// CPC valid range ($)
    pub cpc_range: (f64, f64),
    /// ROAS valid range (multiplier)
    pub roas_range: (f64, f64),
    /// Conversions valid range
    pub conversions_range: (f64, f64),
    /// Bounce rate valid range (%)
    pub bounce_range: (f64, f64),
    /// Spend valid range ($)
    pub spend_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ctr_range: (0.0, 100.0),
            cpc_range: (0.0, 10_000.0),
            roas_range: (0.0, 10_000.0),
            conversions_range: (0.0, 1_000_000_000.0),
            bounce_range: (0.0, 100.0),
            spend_range: (0.0, 1_000_000_000.0),
        }
    }
}

impl ValidationConfig {
    /// Allowed range for a metric
    pub fn range(&self, metric: Metric) -> (f64, f64) {
        match metric {
            Metric::Ctr => self.ctr_range,
            Metric::Cpc => self.cpc_range,
            Metric::Roas => self.roas_range,
            Metric::Conversions => self.conversions_range,
            Metric::BounceRate => self.bounce_range,
            Metric::Spend => self.spend_range,
        }
    }
}

/// Validator for inbound metric samples
pub struct SampleValidator {
    config: ValidationConfig,
}

impl SampleValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single metric value
    pub fn validate_value(&self, metric: Metric, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { metric, value });
        }
        let (min, max) = self.config.range(metric);
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                metric,
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Validate a whole sample; the first failing metric rejects it
    pub fn validate(&self, sample: &MetricSample) -> Result<(), ValidationError> {
        for metric in Metric::ALL {
            if let Err(e) = self.validate_value(metric, sample.value(metric)) {
                debug!(campaign_id = %sample.campaign_id, "Sample rejected: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for SampleValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
