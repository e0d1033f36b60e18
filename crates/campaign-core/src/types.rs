//! Core Campaign and Metric Types

use crate::anomaly::AnomalyType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tracked campaign performance metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Click-through rate (%)
    Ctr,
    /// Cost per click ($)
    Cpc,
    /// Return on ad spend (multiplier)
    Roas,
    /// Conversion count
    Conversions,
    /// Bounce rate (%)
    BounceRate,
    /// Total spend ($)
    Spend,
}

impl Metric {
    /// All metrics in canonical order
    pub const ALL: [Metric; 6] = [
        Metric::Ctr,
        Metric::Cpc,
        Metric::Roas,
        Metric::Conversions,
        Metric::BounceRate,
        Metric::Spend,
    ];

    /// Get string representation (wire format)
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Ctr => "ctr",
            Metric::Cpc => "cpc",
            Metric::Roas => "roas",
            Metric::Conversions => "conversions",
            Metric::BounceRate => "bounceRate",
            Metric::Spend => "spend",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Get string representation (wire format)
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Archived,
}

/// An advertising campaign (created and managed externally)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub status: CampaignStatus,
}

/// One timestamped snapshot of a campaign's performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub campaign_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub ctr: f64,
    pub cpc: f64,
    pub roas: f64,
    pub conversions: f64,
    pub bounce_rate: f64,
    pub spend: f64,
    /// Whether any metric in this sample was flagged anomalous (set by the engine)
    #[serde(default)]
    pub is_anomaly: bool,
    /// Primary anomaly type when flagged (largest deviation wins)
    #[serde(default)]
    pub anomaly_type: Option<AnomalyType>,
}

impl MetricSample {
    /// Read the value of a single metric from this sample
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Ctr => self.ctr,
            Metric::Cpc => self.cpc,
            Metric::Roas => self.roas,
            Metric::Conversions => self.conversions,
            Metric::BounceRate => self.bounce_rate,
            Metric::Spend => self.spend,
        }
    }
}
