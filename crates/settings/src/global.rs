//! Global Notification Settings

use crate::SettingsError;
use serde::{Deserialize, Serialize};

/// Process-wide notification settings, lazily created with defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub slack_enabled: bool,
    pub email_enabled: bool,
    pub in_app_enabled: bool,
    pub slack_webhook: Option<String>,
    pub email_address: Option<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            slack_enabled: false,
            email_enabled: false,
            in_app_enabled: true,
            slack_webhook: None,
            email_address: None,
        }
    }
}

impl GlobalSettings {
    /// Apply a partial update; unset fields keep prior values
    pub fn apply(&mut self, update: &GlobalSettingsUpdate) {
        if let Some(v) = update.slack_enabled {
            self.slack_enabled = v;
        }
        if let Some(v) = update.email_enabled {
            self.email_enabled = v;
        }
        if let Some(v) = update.in_app_enabled {
            self.in_app_enabled = v;
        }
        if let Some(v) = &update.slack_webhook {
            self.slack_webhook = v.clone();
        }
        if let Some(v) = &update.email_address {
            self.email_address = v.clone();
        }
    }
}

/// Partial update to global settings.
///
/// The outer `Option` distinguishes "not provided" from an explicit `null`
/// clearing the webhook/address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSettingsUpdate {
    pub slack_enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub in_app_enabled: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "serde_double_option"
    )]
    pub slack_webhook: Option<Option<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "serde_double_option"
    )]
    pub email_address: Option<Option<String>>,
}

mod serde_double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(ser),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Some(Option::deserialize(de)?))
    }
}

/// Read access to the current global settings, consulted at dispatch time
pub trait GlobalSettingsRead: Send + Sync {
    fn global_settings(&self) -> Result<GlobalSettings, SettingsError>;
}
