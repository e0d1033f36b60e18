//! Alert Engine

use crate::{EngineConfig, EngineError};
use alerting::{
    Alert, AlertError, AlertFilter, AlertLifecycle, AlertStore, Disposition, SubmitOutcome,
    TriggerCandidate, TriggerSource,
};
use anomaly_detector::{AnomalyDetector, AnomalySignal, CampaignBaseline};
use campaign_core::{Campaign, MetricSample, SUGGESTED_ACTIONS};
use health_score::ScoreBreakdown;
use notifications::{LogDelivery, NotificationDelivery, NotificationDispatcher};
use rule_engine::{AlertRule, RuleMatch, SkippedRule};
use sample_validator::SampleValidator;
use serde::Serialize;
use settings::{
    GlobalSettings, GlobalSettingsRead, GlobalSettingsUpdate, SensitivitySettings,
    SensitivityUpdate,
};
use std::collections::HashMap;
use std::sync::Arc;
use storage::Repository;
use tokio::sync::Mutex;
use tracing::{error, warn};
use uuid::Uuid;

/// Outcome of evaluating one sample
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// The sample, annotated with the primary detected anomaly
    pub sample: MetricSample,
    /// Alerts created by this sample
    pub created: Vec<Alert>,
    /// Open alerts that absorbed a duplicate trigger
    pub deduplicated: Vec<Alert>,
    /// Rules skipped because their stored operator no longer parses
    pub skipped_rules: Vec<SkippedRule>,
}

/// The alert engine.
///
/// Samples for one campaign are serialized through that campaign's lane;
/// different campaigns evaluate in parallel. Settings and rules are read
/// fresh from the repository for every sample, so writes take effect on the
/// next evaluation, never mid-flight.
pub struct AlertEngine {
    repository: Arc<Repository>,
    validator: SampleValidator,
    detector: AnomalyDetector,
    lifecycle: AlertLifecycle,
    dispatcher: Arc<NotificationDispatcher>,
    lanes: Mutex<HashMap<Uuid, Arc<Mutex<CampaignBaseline>>>>,
}

impl AlertEngine {
    /// Create an engine with the tracing-backed delivery transport
    pub fn new(config: EngineConfig) -> Self {
        Self::with_delivery(config, Arc::new(LogDelivery::new()))
    }

    /// Create an engine with a custom delivery transport
    pub fn with_delivery(config: EngineConfig, delivery: Arc<dyn NotificationDelivery>) -> Self {
        let repository = Arc::new(Repository::new());
        let store: Arc<dyn AlertStore> = repository.clone();
        let settings_read: Arc<dyn GlobalSettingsRead> = repository.clone();

        Self {
            validator: SampleValidator::new(config.validation),
            detector: AnomalyDetector::new(config.detector),
            lifecycle: AlertLifecycle::new(store),
            dispatcher: Arc::new(NotificationDispatcher::new(settings_read, delivery)),
            lanes: Mutex::new(HashMap::new()),
            repository,
        }
    }

    /// The backing repository
    pub fn repository(&self) -> Arc<Repository> {
        self.repository.clone()
    }

    /// The lane serializing one campaign's evaluations
    async fn lane(&self, campaign_id: Uuid) -> Arc<Mutex<CampaignBaseline>> {
        let mut lanes = self.lanes.lock().await;
        lanes
            .entry(campaign_id)
            .or_insert_with(|| Arc::new(Mutex::new(self.detector.new_baseline(campaign_id))))
            .clone()
    }

    /// Validate, detect, evaluate rules, and submit triggers for one sample.
    ///
    /// Returns the sample annotated with the primary anomaly plus the alerts
    /// this sample created or refreshed. A rejected sample (range or order)
    /// leaves baselines and alerts untouched. Notification dispatch for
    /// created alerts is spawned after the alerts are committed and cannot
    /// roll them back.
    pub async fn evaluate_sample(&self, sample: MetricSample) -> Result<Evaluation, EngineError> {
        self.validator.validate(&sample)?;

        let lane = self.lane(sample.campaign_id).await;
        let mut baseline = lane.lock().await;

        // Fresh reads so settings/rule edits apply from the next sample on
        let sensitivity = self.repository.sensitivity_settings(sample.campaign_id)?;
        let rules = self.repository.rules()?;

        let signals = self.detector.process(&mut baseline, &sample, &sensitivity)?;
        let rule_eval = rule_engine::evaluate(&sample, &rules);

        let mut sample = sample;
        sample.is_anomaly = !signals.is_empty();
        sample.anomaly_type = primary_signal(&signals).map(|s| s.anomaly_type);

        let mut candidates = Vec::with_capacity(signals.len() + rule_eval.matches.len());
        for signal in &signals {
            candidates.push(anomaly_candidate(sample.campaign_id, signal));
        }
        for matched in &rule_eval.matches {
            candidates.push(rule_candidate(sample.campaign_id, matched));
        }

        let mut created = Vec::new();
        let mut deduplicated = Vec::new();
        for candidate in candidates {
            match self.lifecycle.submit(&candidate) {
                Ok(SubmitOutcome::Created(alert)) => created.push(alert),
                Ok(SubmitOutcome::Deduplicated { existing }) => deduplicated.push(existing),
                Err(AlertError::DedupRace {
                    campaign_id,
                    metric,
                }) => {
                    warn!(%campaign_id, %metric, "Trigger discarded after unresolved dedup race");
                }
                Err(e) => return Err(e.into()),
            }
        }
        drop(baseline);

        for alert in &created {
            let dispatcher = Arc::clone(&self.dispatcher);
            let alert = alert.clone();
            tokio::spawn(async move {
                if let Err(e) = dispatcher.dispatch(&alert).await {
                    error!(alert_id = %alert.id, "Notification dispatch failed: {}", e);
                }
            });
        }

        Ok(Evaluation {
            sample,
            created,
            deduplicated,
            skipped_rules: rule_eval.skipped,
        })
    }

    /// Evaluate samples in order; one rejected sample does not abort the rest
    pub async fn evaluate_batch(
        &self,
        samples: Vec<MetricSample>,
    ) -> Vec<Result<Evaluation, EngineError>> {
        let mut results = Vec::with_capacity(samples.len());
        for sample in samples {
            results.push(self.evaluate_sample(sample).await);
        }
        results
    }

    /// Alerts passing the filter, newest first
    pub fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, EngineError> {
        Ok(self.repository.alerts(filter)?)
    }

    /// Resolve or dismiss an alert
    pub fn transition(
        &self,
        alert_id: Uuid,
        disposition: Disposition,
        resolved_by: Option<String>,
    ) -> Result<Alert, EngineError> {
        Ok(self.lifecycle.transition(alert_id, disposition, resolved_by)?)
    }

    /// Health score for one campaign from its open alerts
    pub fn campaign_score(&self, campaign_id: Uuid) -> Result<ScoreBreakdown, EngineError> {
        let open = self.repository.open_alerts(campaign_id)?;
        Ok(health_score::campaign_score(&open))
    }

    /// Mean campaign score across the whole campaign registry
    pub fn portfolio_score(&self) -> Result<u8, EngineError> {
        let campaigns = self.repository.campaigns()?;
        let mut scores = Vec::with_capacity(campaigns.len());
        for campaign in &campaigns {
            let open = self.repository.open_alerts(campaign.id)?;
            scores.push(health_score::campaign_score(&open).score);
        }
        Ok(health_score::portfolio_score(&scores))
    }

    /// Register or update a campaign
    pub fn upsert_campaign(&self, campaign: Campaign) -> Result<(), EngineError> {
        Ok(self.repository.upsert_campaign(campaign)?)
    }

    /// All registered campaigns
    pub fn campaigns(&self) -> Result<Vec<Campaign>, EngineError> {
        Ok(self.repository.campaigns()?)
    }

    /// Sensitivity settings for a campaign, defaults on first read
    pub fn sensitivity_settings(
        &self,
        campaign_id: Uuid,
    ) -> Result<SensitivitySettings, EngineError> {
        Ok(self.repository.sensitivity_settings(campaign_id)?)
    }

    /// Update a campaign's sensitivity settings
    pub fn update_sensitivity(
        &self,
        campaign_id: Uuid,
        update: &SensitivityUpdate,
    ) -> Result<SensitivitySettings, EngineError> {
        Ok(self.repository.update_sensitivity(campaign_id, update)?)
    }

    /// Current global notification settings
    pub fn global_settings(&self) -> Result<GlobalSettings, EngineError> {
        Ok(self.repository.global_settings()?)
    }

    /// Update the global notification settings
    pub fn update_global_settings(
        &self,
        update: &GlobalSettingsUpdate,
    ) -> Result<GlobalSettings, EngineError> {
        Ok(self.repository.update_global_settings(update)?)
    }

    /// Create or replace an alert rule
    pub fn upsert_rule(&self, rule: AlertRule) -> Result<AlertRule, EngineError> {
        Ok(self.repository.upsert_rule(rule)?)
    }

    /// All alert rules
    pub fn rules(&self) -> Result<Vec<AlertRule>, EngineError> {
        Ok(self.repository.rules()?)
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// The dominant signal: largest deviation magnitude, earliest metric in
/// canonical order on a tie
fn primary_signal(signals: &[AnomalySignal]) -> Option<&AnomalySignal> {
    let mut primary: Option<&AnomalySignal> = None;
    for signal in signals {
        let better = match primary {
            Some(p) => signal.deviation.abs() > p.deviation.abs(),
            None => true,
        };
        if better {
            primary = Some(signal);
        }
    }
    primary
}

fn anomaly_candidate(campaign_id: Uuid, signal: &AnomalySignal) -> TriggerCandidate {
    let anomaly_type = signal.anomaly_type;
    TriggerCandidate {
        campaign_id,
        metric: signal.metric,
        source: TriggerSource::Anomaly(anomaly_type),
        severity: anomaly_type.severity(),
        value: signal.value,
        threshold: signal.baseline * anomaly_type.threshold_factor(),
        message: anomaly_type.message(signal.value),
        suggestions: Some(SUGGESTED_ACTIONS.iter().map(|s| s.to_string()).collect()),
    }
}

fn rule_candidate(campaign_id: Uuid, matched: &RuleMatch) -> TriggerCandidate {
    TriggerCandidate {
        campaign_id,
        metric: matched.rule.metric,
        source: TriggerSource::Rule(matched.rule.id),
        severity: matched.rule.severity,
        value: matched.value,
        threshold: matched.rule.threshold,
        message: matched.rule.message(matched.value),
        suggestions: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::{AnomalyType, Metric, Severity};

    fn signal(metric: Metric, anomaly_type: AnomalyType, deviation: f64) -> AnomalySignal {
        AnomalySignal {
            metric,
            anomaly_type,
            value: 1.0,
            baseline: 3.0,
            deviation,
        }
    }

    #[test]
    fn test_primary_signal_largest_magnitude() {
        let signals = vec![
            signal(Metric::Ctr, AnomalyType::CtrLow, -0.4),
            signal(Metric::Spend, AnomalyType::SpendHigh, 0.9),
        ];
        assert_eq!(primary_signal(&signals).unwrap().metric, Metric::Spend);
    }

    #[test]
    fn test_primary_signal_tie_keeps_canonical_order() {
        let signals = vec![
            signal(Metric::Ctr, AnomalyType::CtrLow, -0.5),
            signal(Metric::Spend, AnomalyType::SpendHigh, 0.5),
        ];
        assert_eq!(primary_signal(&signals).unwrap().metric, Metric::Ctr);
    }

    #[test]
    fn test_primary_signal_empty() {
        assert!(primary_signal(&[]).is_none());
    }

    #[test]
    fn test_anomaly_candidate_carries_catalog() {
        let campaign_id = Uuid::new_v4();
        let s = AnomalySignal {
            metric: Metric::Roas,
            anomaly_type: AnomalyType::RoasLow,
            value: 1.2,
            baseline: 3.0,
            deviation: -0.6,
        };
        let candidate = anomaly_candidate(campaign_id, &s);

        assert_eq!(candidate.campaign_id, campaign_id);
        assert_eq!(candidate.severity, Severity::Critical);
        assert_eq!(candidate.message, "ROAS dropped to 1.20x");
        assert!((candidate.threshold - 2.1).abs() < 1e-9);
        assert_eq!(candidate.suggestions.as_ref().unwrap().len(), 4);
        assert!(matches!(
            candidate.source,
            TriggerSource::Anomaly(AnomalyType::RoasLow)
        ));
    }

    #[test]
    fn test_rule_candidate_has_no_suggestions() {
        let rule = AlertRule {
            id: Uuid::new_v4(),
            name: "High CPC Alert".to_string(),
            metric: Metric::Cpc,
            operator: "gt".to_string(),
            threshold: 1.0,
            severity: Severity::Warning,
            enabled: true,
            campaign_id: None,
        };
        let matched = RuleMatch {
            rule: rule.clone(),
            value: 1.5,
        };
        let candidate = rule_candidate(Uuid::new_v4(), &matched);

        assert_eq!(candidate.severity, Severity::Warning);
        assert_eq!(candidate.threshold, 1.0);
        assert!(candidate.suggestions.is_none());
        assert_eq!(
            candidate.message,
            "High CPC Alert: cpc is 1.50, threshold gt 1.00"
        );
        assert!(matches!(candidate.source, TriggerSource::Rule(id) if id == rule.id));
    }
}
