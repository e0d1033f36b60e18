//! Engine Configuration

use crate::EngineError;
use anomaly_detector::DetectorConfig;
use config::{Config, Environment, File};
use sample_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
///
/// Every field has a default, so a missing or partial config file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detector: DetectorConfig,
    pub validation: ValidationConfig,
}

impl EngineConfig {
    /// Load configuration from an optional file plus `ADPULSE_`-prefixed
    /// environment variables (e.g. `ADPULSE_DETECTOR__WINDOW_SIZE=24`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("ADPULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.detector.window_size, 12);
        assert_eq!(config.detector.min_samples, 3);
        assert_eq!(config.validation.ctr_range, (0.0, 100.0));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load("does-not-exist.toml").unwrap();
        assert_eq!(config.detector.window_size, 12);
        assert_eq!(config.detector.deviation_ceiling, 1.0);
    }
}
