//! Health Score Calculation
//!
//! Derives a 0-100 composite score per campaign from its currently-open
//! alerts, and the portfolio-wide mean. Scores are recomputed on read and
//! never stored; closed alerts stop counting immediately.

use alerting::Alert;
use campaign_core::Severity;
use serde::Serialize;

/// Score penalty per open critical alert
const CRITICAL_PENALTY: i64 = 20;
/// Score penalty per open warning alert
const WARNING_PENALTY: i64 = 10;
/// Score penalty per open info alert
const INFO_PENALTY: i64 = 5;

/// Campaign health score with its per-severity breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// `max(0, 100 - 20*critical - 10*warning - 5*info)`
    pub score: u8,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// Compute a campaign's health score from its alerts.
///
/// Only open alerts count; order is irrelevant and there is no age decay.
pub fn campaign_score(alerts: &[Alert]) -> ScoreBreakdown {
    let mut critical = 0usize;
    let mut warning = 0usize;
    let mut info = 0usize;

    for alert in alerts.iter().filter(|a| a.is_open()) {
        match alert.severity {
            Severity::Critical => critical += 1,
            Severity::Warning => warning += 1,
            Severity::Info => info += 1,
        }
    }

    let penalty = critical as i64 * CRITICAL_PENALTY
        + warning as i64 * WARNING_PENALTY
        + info as i64 * INFO_PENALTY;
    let score = (100 - penalty).max(0) as u8;

    ScoreBreakdown {
        score,
        critical,
        warning,
        info,
    }
}

/// Portfolio score: mean of campaign scores rounded to nearest, 0 when
/// there are no campaigns
pub fn portfolio_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u64 = scores.iter().map(|&s| s as u64).sum();
    (sum as f64 / scores.len() as f64).round() as u8
}
