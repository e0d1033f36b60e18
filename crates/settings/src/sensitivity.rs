//! Per-Campaign Sensitivity Settings

use crate::SettingsError;
use campaign_core::Metric;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default sensitivity for every metric
pub const DEFAULT_SENSITIVITY: f64 = 0.2;

/// Anomaly sensitivity coefficients for one campaign.
///
/// Each coefficient is in `[0, 1]`; higher values make smaller deviations
/// from baseline count as anomalous for that metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivitySettings {
    pub campaign_id: Uuid,
    pub ctr_sensitivity: f64,
    pub cpc_sensitivity: f64,
    pub roas_sensitivity: f64,
    pub conversion_sensitivity: f64,
    pub bounce_sensitivity: f64,
    pub spend_sensitivity: f64,
}

impl SensitivitySettings {
    /// Default settings for a campaign (all coefficients 0.2)
    pub fn defaults_for(campaign_id: Uuid) -> Self {
        Self {
            campaign_id,
            ctr_sensitivity: DEFAULT_SENSITIVITY,
            cpc_sensitivity: DEFAULT_SENSITIVITY,
            roas_sensitivity: DEFAULT_SENSITIVITY,
            conversion_sensitivity: DEFAULT_SENSITIVITY,
            bounce_sensitivity: DEFAULT_SENSITIVITY,
            spend_sensitivity: DEFAULT_SENSITIVITY,
        }
    }

    /// Coefficient for a metric
    pub fn sensitivity(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Ctr => self.ctr_sensitivity,
            Metric::Cpc => self.cpc_sensitivity,
            Metric::Roas => self.roas_sensitivity,
            Metric::Conversions => self.conversion_sensitivity,
            Metric::BounceRate => self.bounce_sensitivity,
            Metric::Spend => self.spend_sensitivity,
        }
    }

    /// Apply a partial update. All provided values are validated before any
    /// field is written, so a rejected update leaves the settings untouched.
    pub fn apply(&mut self, update: &SensitivityUpdate) -> Result<(), SettingsError> {
        update.validate()?;

        if let Some(v) = update.ctr_sensitivity {
            self.ctr_sensitivity = v;
        }
        if let Some(v) = update.cpc_sensitivity {
            self.cpc_sensitivity = v;
        }
        if let Some(v) = update.roas_sensitivity {
            self.roas_sensitivity = v;
        }
        if let Some(v) = update.conversion_sensitivity {
            self.conversion_sensitivity = v;
        }
        if let Some(v) = update.bounce_sensitivity {
            self.bounce_sensitivity = v;
        }
        if let Some(v) = update.spend_sensitivity {
            self.spend_sensitivity = v;
        }
        Ok(())
    }
}

/// Partial update to sensitivity settings; unset fields keep prior values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensitivityUpdate {
    pub ctr_sensitivity: Option<f64>,
    pub cpc_sensitivity: Option<f64>,
    pub roas_sensitivity: Option<f64>,
    pub conversion_sensitivity: Option<f64>,
    pub bounce_sensitivity: Option<f64>,
    pub spend_sensitivity: Option<f64>,
}

impl SensitivityUpdate {
    /// Check all provided coefficients are finite and within [0, 1]
    pub fn validate(&self) -> Result<(), SettingsError> {
        let provided = [
            (Metric::Ctr, self.ctr_sensitivity),
            (Metric::Cpc, self.cpc_sensitivity),
            (Metric::Roas, self.roas_sensitivity),
            (Metric::Conversions, self.conversion_sensitivity),
            (Metric::BounceRate, self.bounce_sensitivity),
            (Metric::Spend, self.spend_sensitivity),
        ];
        for (metric, value) in provided {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                    return Err(SettingsError::InvalidSensitivity { metric, value: v });
                }
            }
        }
        Ok(())
    }
}
