//! Deviation Detector

use crate::baseline::CampaignBaseline;
use crate::DetectorError;
use campaign_core::{AdverseDirection, AnomalyType, Metric, MetricSample};
use serde::{Deserialize, Serialize};
use settings::SensitivitySettings;
use tracing::debug;
use uuid::Uuid;

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Samples retained per metric window (default: 12)
    pub window_size: usize,
    /// Accepted samples required before anomalies are reported (default: 3)
    pub min_samples: usize,
    /// Relative deviation required at sensitivity 0; the required deviation
    /// is `(1 - sensitivity) * deviation_ceiling` (default: 1.0)
    pub deviation_ceiling: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 12,
            min_samples: 3,
            deviation_ceiling: 1.0,
        }
    }
}

/// One anomalous metric found in a sample
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalySignal {
    pub metric: Metric,
    pub anomaly_type: AnomalyType,
    /// Observed value
    pub value: f64,
    /// Rolling baseline the value was compared against
    pub baseline: f64,
    /// Signed relative deviation, `(value - baseline) / baseline`
    pub deviation: f64,
}

/// Rolling-baseline anomaly detector
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    /// Create a detector with given config
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Get the detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Create an empty baseline sized for this detector
    pub fn new_baseline(&self, campaign_id: Uuid) -> CampaignBaseline {
        CampaignBaseline::new(campaign_id, self.config.window_size)
    }

    /// Evaluate a sample against the pre-sample baseline.
    ///
    /// Pure with respect to the baseline: the caller decides when to fold
    /// the sample in. Warm-up samples and non-positive baselines yield no
    /// signals. At most one signal per metric.
    pub fn evaluate(
        &self,
        sample: &MetricSample,
        settings: &SensitivitySettings,
        baseline: &CampaignBaseline,
    ) -> Vec<AnomalySignal> {
        if !baseline.is_warm(self.config.min_samples) {
            return Vec::new();
        }

        let mut signals = Vec::new();
        for metric in Metric::ALL {
            let mean = match baseline.mean(metric) {
                Some(m) if m > 0.0 => m,
                // Relative deviation is undefined at or below zero
                _ => continue,
            };

            let value = sample.value(metric);
            let deviation = (value - mean) / mean;
            let sensitivity = settings.sensitivity(metric).clamp(0.0, 1.0);
            let required = (1.0 - sensitivity) * self.config.deviation_ceiling;

            let anomaly_type = AnomalyType::for_metric(metric);
            let adverse = match anomaly_type.direction() {
                AdverseDirection::Low => -deviation,
                AdverseDirection::High => deviation,
            };

            if adverse > required {
                debug!(
                    campaign_id = %sample.campaign_id,
                    metric = %metric,
                    value,
                    baseline = mean,
                    "Anomaly: {} deviated {:.1}% from baseline",
                    anomaly_type,
                    deviation * 100.0
                );
                signals.push(AnomalySignal {
                    metric,
                    anomaly_type,
                    value,
                    baseline: mean,
                    deviation,
                });
            }
        }
        signals
    }

    /// Order-check, evaluate, and fold the sample into the baseline.
    ///
    /// A sample older than the newest accepted one is rejected whole and
    /// leaves the baseline untouched; equal timestamps are accepted.
    pub fn process(
        &self,
        baseline: &mut CampaignBaseline,
        sample: &MetricSample,
        settings: &SensitivitySettings,
    ) -> Result<Vec<AnomalySignal>, DetectorError> {
        if let Some(last_seen) = baseline.last_seen() {
            if sample.timestamp < last_seen {
                return Err(DetectorError::OutOfOrderSample {
                    campaign_id: sample.campaign_id,
                    last_seen,
                    timestamp: sample.timestamp,
                });
            }
        }

        let signals = self.evaluate(sample, settings, baseline);
        baseline.observe(sample);
        Ok(signals)
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
