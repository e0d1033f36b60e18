//! Storage Layer
//!
//! In-memory repository behind the engine's store seams: campaign registry,
//! per-campaign sensitivity settings, global settings, alert rules, and the
//! alert table with its open-alert uniqueness index. Settings rows are
//! created lazily with defaults on first read; invalid writes keep the
//! prior value.

mod repository;

pub use repository::Repository;

use rule_engine::RuleError;
use settings::SettingsError;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// A table lock was poisoned
    #[error("Lock error: {0}")]
    Lock(String),

    /// Settings write rejected by domain validation
    #[error("Invalid settings update: {0}")]
    Settings(#[from] SettingsError),

    /// Rule write rejected by domain validation
    #[error("Invalid rule: {0}")]
    Rule(#[from] RuleError),
}
