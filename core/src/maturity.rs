//! Maturity gate — has enough time elapsed to trust the after-window?
//!
//! Maturity formula: action_date + horizon + buffer ≤ latest_data_date.
//! Mature actions with zero traffic on both sides are Dormant: their
//! baseline exists but nothing has happened yet to measure.

use crate::config::ImpactConfig;
use crate::snapshot::WindowTotals;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityStatus {
    /// Not enough calendar days have passed since the action.
    Immature,
    /// Mature by the calendar, but no spend occurred in either window.
    Dormant,
    /// Full horizon plus settle buffer elapsed; trustworthy.
    Mature,
}

impl MaturityStatus {
    /// Records that participate in aggregation. Everything else is
    /// reported as pending, never silently dropped.
    pub fn is_aggregatable(&self) -> bool {
        matches!(self, MaturityStatus::Mature)
    }
}

pub fn maturity_status(
    action_date: NaiveDate,
    latest_data_date: NaiveDate,
    before: &WindowTotals,
    after: &WindowTotals,
    config: &ImpactConfig,
) -> MaturityStatus {
    let elapsed = (latest_data_date - action_date).num_days();
    if elapsed < config.horizon_days + config.maturity_buffer_days {
        return MaturityStatus::Immature;
    }
    if before.spend == 0.0 && after.spend == 0.0 {
        return MaturityStatus::Dormant;
    }
    MaturityStatus::Mature
}

/// Days remaining until an immature action matures at this horizon.
pub fn days_until_mature(
    action_date: NaiveDate,
    latest_data_date: NaiveDate,
    config: &ImpactConfig,
) -> i64 {
    let required = config.horizon_days + config.maturity_buffer_days;
    let elapsed = (latest_data_date - action_date).num_days();
    (required - elapsed).max(0)
}
