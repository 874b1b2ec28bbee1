//! Aggregate confidence classification.
//!
//! A classification layer only; it never alters impact values.
//! Signal-to-noise over per-record uncertainty: records backed by thin
//! click volume contribute more noise, so a total built from them
//! earns less trust.

use crate::record::ImpactRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    pub level: ConfidenceLevel,
    pub signal_ratio: f64,
    pub total_sigma: f64,
}

/// Minimum included records for High confidence.
const MIN_RECORDS_FOR_HIGH: usize = 30;
/// Sigma multiplier for records in a softening auction.
const DOWNSHIFT_SIGMA_MULTIPLIER: f64 = 1.3;
/// Reported ratio when no noise is modeled at all.
const SIGNAL_RATIO_CAP: f64 = 100.0;

pub fn classify_confidence(records: &[&ImpactRecord]) -> ConfidenceReport {
    if records.is_empty() {
        return ConfidenceReport {
            level: ConfidenceLevel::Low,
            signal_ratio: 0.0,
            total_sigma: 0.0,
        };
    }

    let mut total_impact = 0.0;
    let mut variance_sum = 0.0;
    let mut downshift_impact = 0.0;

    for record in records {
        let impact = record.final_impact;
        total_impact += impact;

        // Per-record sigma: the un-earned share of the impact.
        let mut sigma = impact.abs() * (1.0 - record.confidence_weight);
        if record.market_downshift {
            sigma *= DOWNSHIFT_SIGMA_MULTIPLIER;
            downshift_impact += impact.abs();
        }
        variance_sum += sigma * sigma;
    }

    let total_sigma = variance_sum.sqrt();
    let signal_ratio = if total_sigma > 0.0 {
        total_impact.abs() / total_sigma
    } else if total_impact != 0.0 {
        // Every record fully weighted: no modeled noise at all.
        // Finite cap keeps the report JSON-representable.
        SIGNAL_RATIO_CAP
    } else {
        0.0
    };

    let mut level = if signal_ratio >= 1.5 && records.len() >= MIN_RECORDS_FOR_HIGH {
        ConfidenceLevel::High
    } else if signal_ratio >= 0.8 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    // Downgrade when a softening auction dominates the total: the
    // attribution there is ambiguous regardless of click volume.
    if total_impact != 0.0 && downshift_impact / total_impact.abs() > 0.4 {
        level = match level {
            ConfidenceLevel::High => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        };
    }

    ConfidenceReport {
        level,
        signal_ratio,
        total_sigma,
    }
}
