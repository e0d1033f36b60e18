//! Campaign Alert Engine
//!
//! Composition root wiring sample validation, anomaly detection, rule
//! evaluation, the alert lifecycle, health scores, and notification
//! dispatch over the in-memory repository.

mod config;
mod engine;
mod error;

pub use config::EngineConfig;
pub use engine::{AlertEngine, Evaluation};
pub use error::EngineError;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
