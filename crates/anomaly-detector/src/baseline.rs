//! Per-Campaign Rolling Baselines

use campaign_core::{Metric, MetricSample, MetricWindow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Rolling baseline state for one campaign: one bounded window per metric
/// plus the newest accepted timestamp.
#[derive(Debug, Clone)]
pub struct CampaignBaseline {
    campaign_id: Uuid,
    windows: [MetricWindow; 6],
    last_seen: Option<DateTime<Utc>>,
    samples_accepted: u64,
}

fn slot(metric: Metric) -> usize {
    match metric {
        Metric::Ctr => 0,
        Metric::Cpc => 1,
        Metric::Roas => 2,
        Metric::Conversions => 3,
        Metric::BounceRate => 4,
        Metric::Spend => 5,
    }
}

impl CampaignBaseline {
    /// Create an empty baseline retaining `window_size` samples per metric
    pub fn new(campaign_id: Uuid, window_size: usize) -> Self {
        Self {
            campaign_id,
            windows: std::array::from_fn(|_| MetricWindow::new(window_size)),
            last_seen: None,
            samples_accepted: 0,
        }
    }

    /// Campaign this baseline belongs to
    pub fn campaign_id(&self) -> Uuid {
        self.campaign_id
    }

    /// Newest accepted sample timestamp
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Total samples folded into this baseline
    pub fn samples_accepted(&self) -> u64 {
        self.samples_accepted
    }

    /// Whether enough samples were accepted to report anomalies
    pub fn is_warm(&self, min_samples: usize) -> bool {
        self.samples_accepted >= min_samples as u64
    }

    /// Rolling mean for a metric, `None` before the first accepted sample
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.windows[slot(metric)].mean()
    }

    /// Fold an accepted sample into the windows and advance `last_seen`
    pub fn observe(&mut self, sample: &MetricSample) {
        for metric in Metric::ALL {
            self.windows[slot(metric)].push(sample.value(metric));
        }
        self.last_seen = Some(sample.timestamp);
        self.samples_accepted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(ts_hour: u32, roas: f64) -> MetricSample {
        MetricSample {
            campaign_id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, ts_hour, 0, 0).unwrap(),
            ctr: 2.5,
            cpc: 0.6,
            roas,
            conversions: 14.0,
            bounce_rate: 38.0,
            spend: 150.0,
            is_anomaly: false,
            anomaly_type: None,
        }
    }

    #[test]
    fn test_observe_updates_mean_and_last_seen() {
        let mut baseline = CampaignBaseline::new(Uuid::new_v4(), 12);
        assert!(baseline.mean(Metric::Roas).is_none());
        assert!(baseline.last_seen().is_none());

        baseline.observe(&sample(0, 3.0));
        baseline.observe(&sample(1, 4.0));

        assert!((baseline.mean(Metric::Roas).unwrap() - 3.5).abs() < 1e-9);
        assert_eq!(baseline.samples_accepted(), 2);
        assert_eq!(
            baseline.last_seen().unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window_bounded() {
        let mut baseline = CampaignBaseline::new(Uuid::new_v4(), 3);
        for (hour, roas) in [(0, 1.0), (1, 2.0), (2, 3.0), (3, 10.0)] {
            baseline.observe(&sample(hour, roas));
        }
        // First value evicted, mean over [2, 3, 10]
        assert!((baseline.mean(Metric::Roas).unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(baseline.samples_accepted(), 4);
    }

    #[test]
    fn test_warm_up_gate() {
        let mut baseline = CampaignBaseline::new(Uuid::new_v4(), 12);
        assert!(!baseline.is_warm(3));
        for hour in 0..3 {
            baseline.observe(&sample(hour, 3.0));
        }
        assert!(baseline.is_warm(3));
    }
}
