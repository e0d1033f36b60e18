//! Anomaly Catalog
//!
//! Maps each detectable anomaly to its metric, direction, severity, reported
//! threshold factor, and operator-facing message.

use crate::types::{Metric, Severity};
use serde::{Deserialize, Serialize};

/// Standard remediation suggestions attached to anomaly alerts
pub const SUGGESTED_ACTIONS: [&str; 4] = [
    "Review targeting parameters",
    "Check ad creative performance",
    "Consider adjusting bid strategy",
    "Analyze competitor activity",
];

/// Which direction of deviation is adverse for a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdverseDirection {
    /// Falling below baseline is the problem (ctr, roas, conversions)
    Low,
    /// Rising above baseline is the problem (cpc, bounce rate, spend)
    High,
}

/// Anomaly type detected against the rolling baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    CtrLow,
    CpcHigh,
    RoasLow,
    ConversionsLow,
    BounceHigh,
    SpendHigh,
}

impl AnomalyType {
    /// The single anomaly type each metric can produce
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Ctr => AnomalyType::CtrLow,
            Metric::Cpc => AnomalyType::CpcHigh,
            Metric::Roas => AnomalyType::RoasLow,
            Metric::Conversions => AnomalyType::ConversionsLow,
            Metric::BounceRate => AnomalyType::BounceHigh,
            Metric::Spend => AnomalyType::SpendHigh,
        }
    }

    /// Get string representation (wire format)
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::CtrLow => "ctr_low",
            AnomalyType::CpcHigh => "cpc_high",
            AnomalyType::RoasLow => "roas_low",
            AnomalyType::ConversionsLow => "conversions_low",
            AnomalyType::BounceHigh => "bounce_high",
            AnomalyType::SpendHigh => "spend_high",
        }
    }

    /// The metric this anomaly is about
    pub fn metric(&self) -> Metric {
        match self {
            AnomalyType::CtrLow => Metric::Ctr,
            AnomalyType::CpcHigh => Metric::Cpc,
            AnomalyType::RoasLow => Metric::Roas,
            AnomalyType::ConversionsLow => Metric::Conversions,
            AnomalyType::BounceHigh => Metric::BounceRate,
            AnomalyType::SpendHigh => Metric::Spend,
        }
    }

    /// Adverse deviation direction for the underlying metric
    pub fn direction(&self) -> AdverseDirection {
        match self {
            AnomalyType::CtrLow | AnomalyType::RoasLow | AnomalyType::ConversionsLow => {
                AdverseDirection::Low
            }
            AnomalyType::CpcHigh | AnomalyType::BounceHigh | AnomalyType::SpendHigh => {
                AdverseDirection::High
            }
        }
    }

    /// Severity assigned to alerts of this type
    pub fn severity(&self) -> Severity {
        match self {
            AnomalyType::CtrLow => Severity::Critical,
            AnomalyType::RoasLow => Severity::Critical,
            AnomalyType::CpcHigh => Severity::Warning,
            AnomalyType::ConversionsLow => Severity::Warning,
            AnomalyType::SpendHigh => Severity::Warning,
            AnomalyType::BounceHigh => Severity::Info,
        }
    }

    /// Factor applied to the baseline when reporting the crossed threshold
    pub fn threshold_factor(&self) -> f64 {
        match self {
            AnomalyType::CtrLow => 0.7,
            AnomalyType::CpcHigh => 1.5,
            AnomalyType::RoasLow => 0.7,
            AnomalyType::ConversionsLow => 0.5,
            AnomalyType::BounceHigh => 1.3,
            AnomalyType::SpendHigh => 1.5,
        }
    }

    /// Operator-facing message for the observed value
    pub fn message(&self, value: f64) -> String {
        match self {
            AnomalyType::CtrLow => format!("CTR dropped significantly to {:.2}%", value),
            AnomalyType::CpcHigh => format!("CPC increased to ${:.2}", value),
            AnomalyType::RoasLow => format!("ROAS dropped to {:.2}x", value),
            AnomalyType::ConversionsLow => format!("Conversions dropped to {:.0}", value),
            AnomalyType::BounceHigh => format!("Bounce rate increased to {:.1}%", value),
            AnomalyType::SpendHigh => format!("Spend increased to ${:.2}", value),
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
