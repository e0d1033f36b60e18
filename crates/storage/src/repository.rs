//! Repository Implementation

use crate::StorageError;
use alerting::{
    Alert, AlertError, AlertFilter, AlertStore, DedupKey, Disposition, InsertOutcome,
    RefreshOutcome,
};
use campaign_core::Campaign;
use chrono::{DateTime, Utc};
use rule_engine::AlertRule;
use settings::{
    GlobalSettings, GlobalSettingsRead, GlobalSettingsUpdate, SensitivitySettings,
    SensitivityUpdate, SettingsError,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Alert rows plus the open-alert uniqueness index, guarded together so
/// check-and-insert and transition stay atomic
#[derive(Default)]
struct AlertTable {
    rows: Vec<Alert>,
    open_index: HashMap<DedupKey, Uuid>,
}

/// In-memory repository for all engine state
pub struct Repository {
    campaigns: Mutex<HashMap<Uuid, Campaign>>,
    sensitivity: Mutex<HashMap<Uuid, SensitivitySettings>>,
    global: Mutex<Option<GlobalSettings>>,
    rules: Mutex<Vec<AlertRule>>,
    alerts: Mutex<AlertTable>,
}

impl Repository {
    /// Create an empty repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            campaigns: Mutex::new(HashMap::new()),
            sensitivity: Mutex::new(HashMap::new()),
            global: Mutex::new(None),
            rules: Mutex::new(Vec::new()),
            alerts: Mutex::new(AlertTable::default()),
        }
    }

    // --- campaigns ---

    /// Insert or replace a campaign
    pub fn upsert_campaign(&self, campaign: Campaign) -> Result<(), StorageError> {
        let mut campaigns = self
            .campaigns
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        campaigns.insert(campaign.id, campaign);
        Ok(())
    }

    /// Fetch one campaign
    pub fn campaign(&self, id: Uuid) -> Result<Option<Campaign>, StorageError> {
        let campaigns = self
            .campaigns
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        Ok(campaigns.get(&id).cloned())
    }

    /// All campaigns, ordered by name for stable listings
    pub fn campaigns(&self) -> Result<Vec<Campaign>, StorageError> {
        let campaigns = self
            .campaigns
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        let mut out: Vec<_> = campaigns.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    // --- sensitivity settings ---

    /// Sensitivity settings for a campaign, created with defaults on first
    /// read
    pub fn sensitivity_settings(
        &self,
        campaign_id: Uuid,
    ) -> Result<SensitivitySettings, StorageError> {
        let mut table = self
            .sensitivity
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        Ok(table
            .entry(campaign_id)
            .or_insert_with(|| {
                debug!(campaign_id = %campaign_id, "Creating default sensitivity settings");
                SensitivitySettings::defaults_for(campaign_id)
            })
            .clone())
    }

    /// Apply a validated partial update; a rejected update leaves the
    /// stored settings untouched
    pub fn update_sensitivity(
        &self,
        campaign_id: Uuid,
        update: &SensitivityUpdate,
    ) -> Result<SensitivitySettings, StorageError> {
        let mut table = self
            .sensitivity
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        let settings = table
            .entry(campaign_id)
            .or_insert_with(|| SensitivitySettings::defaults_for(campaign_id));
        settings.apply(update)?;
        Ok(settings.clone())
    }

    // --- global settings ---

    /// Global settings, created with defaults on first read
    pub fn global_settings(&self) -> Result<GlobalSettings, StorageError> {
        let mut cell = self
            .global
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        Ok(cell.get_or_insert_with(GlobalSettings::default).clone())
    }

    /// Apply a partial update to the global settings
    pub fn update_global_settings(
        &self,
        update: &GlobalSettingsUpdate,
    ) -> Result<GlobalSettings, StorageError> {
        let mut cell = self
            .global
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        let settings = cell.get_or_insert_with(GlobalSettings::default);
        settings.apply(update);
        Ok(settings.clone())
    }

    // --- alert rules ---

    /// Insert or replace a rule by id; the operator token must parse
    pub fn upsert_rule(&self, rule: AlertRule) -> Result<AlertRule, StorageError> {
        rule.validate()?;
        let mut rules = self
            .rules
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule.clone(),
            None => rules.push(rule.clone()),
        }
        Ok(rule)
    }

    /// All rules
    pub fn rules(&self) -> Result<Vec<AlertRule>, StorageError> {
        let rules = self
            .rules
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        Ok(rules.clone())
    }

    /// Fetch one rule
    pub fn rule(&self, id: Uuid) -> Result<Option<AlertRule>, StorageError> {
        let rules = self
            .rules
            .lock()
            .map_err(|e| StorageError::Lock(format!("{}", e)))?;
        Ok(rules.iter().find(|r| r.id == id).cloned())
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut campaigns) = self.campaigns.lock() {
            campaigns.clear();
        }
        if let Ok(mut sensitivity) = self.sensitivity.lock() {
            sensitivity.clear();
        }
        if let Ok(mut global) = self.global.lock() {
            *global = None;
        }
        if let Ok(mut rules) = self.rules.lock() {
            rules.clear();
        }
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.rows.clear();
            alerts.open_index.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertStore for Repository {
    fn open_alert_for(&self, key: &DedupKey) -> Result<Option<Alert>, AlertError> {
        let table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        let Some(&id) = table.open_index.get(key) else {
            return Ok(None);
        };
        Ok(table.rows.iter().find(|a| a.id == id).cloned())
    }

    fn insert_open(&self, alert: Alert) -> Result<InsertOutcome, AlertError> {
        let mut table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        let key = alert.dedup_key();

        if let Some(&winner_id) = table.open_index.get(&key) {
            let winner = table
                .rows
                .iter()
                .find(|a| a.id == winner_id)
                .cloned()
                .ok_or_else(|| {
                    AlertError::Store(format!("Open index points at missing alert {}", winner_id))
                })?;
            return Ok(InsertOutcome::RacedOpen(winner));
        }

        table.open_index.insert(key, alert.id);
        table.rows.push(alert.clone());
        Ok(InsertOutcome::Inserted(alert))
    }

    fn refresh_value(&self, alert_id: Uuid, value: f64) -> Result<RefreshOutcome, AlertError> {
        let mut table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        let alert = table
            .rows
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(AlertError::NotFound(alert_id))?;
        if !alert.is_open() {
            return Ok(RefreshOutcome::NoLongerOpen(alert.clone()));
        }
        alert.value = value;
        Ok(RefreshOutcome::Refreshed(alert.clone()))
    }

    fn apply_transition(
        &self,
        alert_id: Uuid,
        disposition: Disposition,
        resolved_by: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Alert, AlertError> {
        let mut table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        let alert = table
            .rows
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(AlertError::NotFound(alert_id))?;
        alert.apply_transition(disposition, resolved_by, at)?;
        let closed = alert.clone();
        table.open_index.remove(&closed.dedup_key());
        Ok(closed)
    }

    fn alert(&self, alert_id: Uuid) -> Result<Option<Alert>, AlertError> {
        let table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        Ok(table.rows.iter().find(|a| a.id == alert_id).cloned())
    }

    fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertError> {
        let table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        let mut out: Vec<_> = table
            .rows
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn open_alerts(&self, campaign_id: Uuid) -> Result<Vec<Alert>, AlertError> {
        let table = self
            .alerts
            .lock()
            .map_err(|e| AlertError::Store(format!("Lock error: {}", e)))?;
        Ok(table
            .rows
            .iter()
            .filter(|a| a.is_open() && a.campaign_id == campaign_id)
            .cloned()
            .collect())
    }
}

impl GlobalSettingsRead for Repository {
    fn global_settings(&self) -> Result<GlobalSettings, SettingsError> {
        Repository::global_settings(self).map_err(|e| SettingsError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{AlertStatus, TriggerCandidate, TriggerSource};
    use campaign_core::{AnomalyType, CampaignStatus, Metric, Severity};
    use chrono::Duration;

    fn candidate(campaign_id: Uuid, source: TriggerSource) -> TriggerCandidate {
        TriggerCandidate {
            campaign_id,
            metric: source_metric(source),
            source,
            severity: Severity::Critical,
            value: 1.2,
            threshold: 2.1,
            message: "ROAS dropped to 1.20x".to_string(),
            suggestions: None,
        }
    }

    fn source_metric(source: TriggerSource) -> Metric {
        match source {
            TriggerSource::Anomaly(t) => t.metric(),
            TriggerSource::Rule(_) => Metric::Roas,
        }
    }

    fn anomaly_source() -> TriggerSource {
        TriggerSource::Anomaly(AnomalyType::RoasLow)
    }

    #[test]
    fn test_sensitivity_created_on_first_read() {
        let repo = Repository::new();
        let campaign_id = Uuid::new_v4();

        let settings = repo.sensitivity_settings(campaign_id).unwrap();
        assert_eq!(settings.roas_sensitivity, 0.2);

        // Second read returns the same row
        let again = repo.sensitivity_settings(campaign_id).unwrap();
        assert_eq!(settings, again);
    }

    #[test]
    fn test_invalid_sensitivity_update_keeps_prior() {
        let repo = Repository::new();
        let campaign_id = Uuid::new_v4();

        repo.update_sensitivity(
            campaign_id,
            &SensitivityUpdate {
                roas_sensitivity: Some(0.7),
                ..Default::default()
            },
        )
        .unwrap();

        let err = repo
            .update_sensitivity(
                campaign_id,
                &SensitivityUpdate {
                    roas_sensitivity: Some(2.0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::Settings(_)));

        let settings = repo.sensitivity_settings(campaign_id).unwrap();
        assert_eq!(settings.roas_sensitivity, 0.7);
    }

    #[test]
    fn test_global_settings_lazy_defaults_and_update() {
        let repo = Repository::new();
        let settings = repo.global_settings().unwrap();
        assert!(settings.in_app_enabled);
        assert!(!settings.slack_enabled);

        let updated = repo
            .update_global_settings(&GlobalSettingsUpdate {
                slack_enabled: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(updated.slack_enabled);
        assert!(repo.global_settings().unwrap().slack_enabled);
    }

    #[test]
    fn test_rule_write_validates_operator() {
        let repo = Repository::new();
        let mut rule = AlertRule {
            id: Uuid::new_v4(),
            name: "High CPC".to_string(),
            metric: Metric::Cpc,
            operator: "between".to_string(),
            threshold: 1.0,
            severity: Severity::Warning,
            enabled: true,
            campaign_id: None,
        };

        assert!(matches!(
            repo.upsert_rule(rule.clone()).unwrap_err(),
            StorageError::Rule(_)
        ));
        assert!(repo.rules().unwrap().is_empty());

        rule.operator = "gt".to_string();
        repo.upsert_rule(rule.clone()).unwrap();
        assert_eq!(repo.rules().unwrap().len(), 1);

        // Upsert replaces by id
        rule.threshold = 2.0;
        repo.upsert_rule(rule.clone()).unwrap();
        let stored = repo.rule(rule.id).unwrap().unwrap();
        assert_eq!(stored.threshold, 2.0);
        assert_eq!(repo.rules().unwrap().len(), 1);
    }

    #[test]
    fn test_open_key_uniqueness() {
        let repo = Repository::new();
        let campaign_id = Uuid::new_v4();
        let first = candidate(campaign_id, anomaly_source()).to_alert(Utc::now());
        let first_id = first.id;

        assert!(matches!(
            repo.insert_open(first).unwrap(),
            InsertOutcome::Inserted(_)
        ));

        let second = candidate(campaign_id, anomaly_source()).to_alert(Utc::now());
        match repo.insert_open(second).unwrap() {
            InsertOutcome::RacedOpen(winner) => assert_eq!(winner.id, first_id),
            InsertOutcome::Inserted(_) => panic!("duplicate open key accepted"),
        }
    }

    #[test]
    fn test_transition_frees_the_key() {
        let repo = Repository::new();
        let campaign_id = Uuid::new_v4();
        let alert = candidate(campaign_id, anomaly_source()).to_alert(Utc::now());
        let alert_id = alert.id;
        repo.insert_open(alert).unwrap();

        let resolved = repo
            .apply_transition(alert_id, Disposition::Resolved, None, Utc::now())
            .unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert_eq!(resolved.resolved_by.as_deref(), Some("system"));

        // Key is free again
        let next = candidate(campaign_id, anomaly_source()).to_alert(Utc::now());
        assert!(matches!(
            repo.insert_open(next).unwrap(),
            InsertOutcome::Inserted(_)
        ));
    }

    #[test]
    fn test_refresh_only_touches_open_alerts() {
        let repo = Repository::new();
        let alert = candidate(Uuid::new_v4(), anomaly_source()).to_alert(Utc::now());
        let alert_id = alert.id;
        repo.insert_open(alert).unwrap();

        match repo.refresh_value(alert_id, 0.9).unwrap() {
            RefreshOutcome::Refreshed(a) => assert_eq!(a.value, 0.9),
            RefreshOutcome::NoLongerOpen(_) => panic!("open alert reported closed"),
        }

        repo.apply_transition(alert_id, Disposition::Dismissed, None, Utc::now())
            .unwrap();
        assert!(matches!(
            repo.refresh_value(alert_id, 0.5).unwrap(),
            RefreshOutcome::NoLongerOpen(_)
        ));
        // Value untouched by the late refresh
        let stored = AlertStore::alert(&repo, alert_id).unwrap().unwrap();
        assert_eq!(stored.value, 0.9);
    }

    #[test]
    fn test_alert_feed_newest_first_with_filters() {
        let repo = Repository::new();
        let campaign_a = Uuid::new_v4();
        let campaign_b = Uuid::new_v4();
        let base = Utc::now();

        let mut old = candidate(campaign_a, anomaly_source()).to_alert(base - Duration::hours(2));
        old.severity = Severity::Warning;
        old.source = TriggerSource::Anomaly(AnomalyType::CpcHigh);
        old.metric = Metric::Cpc;
        let newer = candidate(campaign_a, anomaly_source()).to_alert(base - Duration::hours(1));
        let other = candidate(campaign_b, anomaly_source()).to_alert(base);

        repo.insert_open(old).unwrap();
        repo.insert_open(newer.clone()).unwrap();
        repo.insert_open(other).unwrap();

        let all = repo.alerts(&AlertFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].created_at >= all[1].created_at);
        assert!(all[1].created_at >= all[2].created_at);

        let for_a = repo
            .alerts(&AlertFilter {
                campaign_id: Some(campaign_a),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].id, newer.id);

        let critical = repo
            .alerts(&AlertFilter {
                severity: Some(Severity::Critical),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(critical.len(), 2);
    }

    #[test]
    fn test_open_alerts_per_campaign() {
        let repo = Repository::new();
        let campaign = Uuid::new_v4();

        let a = candidate(campaign, anomaly_source()).to_alert(Utc::now());
        let mut b = candidate(campaign, TriggerSource::Rule(Uuid::new_v4())).to_alert(Utc::now());
        b.metric = Metric::Cpc;
        let a_id = a.id;
        repo.insert_open(a).unwrap();
        repo.insert_open(b).unwrap();
        repo.apply_transition(a_id, Disposition::Resolved, None, Utc::now())
            .unwrap();

        let open = repo.open_alerts(campaign).unwrap();
        assert_eq!(open.len(), 1);
        assert!(matches!(open[0].source, TriggerSource::Rule(_)));
    }

    #[test]
    fn test_campaign_registry() {
        let repo = Repository::new();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: "Summer Sale 2024".to_string(),
            status: CampaignStatus::Active,
        };
        repo.upsert_campaign(campaign.clone()).unwrap();
        repo.upsert_campaign(Campaign {
            id: Uuid::new_v4(),
            name: "Brand Awareness".to_string(),
            status: CampaignStatus::Paused,
        })
        .unwrap();

        assert_eq!(repo.campaigns().unwrap().len(), 2);
        assert_eq!(
            repo.campaign(campaign.id).unwrap().unwrap().name,
            "Summer Sale 2024"
        );
        // Sorted by name
        assert_eq!(repo.campaigns().unwrap()[0].name, "Brand Awareness");
    }

    #[test]
    fn test_clear() {
        let repo = Repository::new();
        repo.sensitivity_settings(Uuid::new_v4()).unwrap();
        repo.insert_open(candidate(Uuid::new_v4(), anomaly_source()).to_alert(Utc::now()))
            .unwrap();

        repo.clear();
        assert!(repo.alerts(&AlertFilter::default()).unwrap().is_empty());
        assert!(repo.campaigns().unwrap().is_empty());
    }
}
