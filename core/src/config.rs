//! Engine configuration — every tolerance the attribution math uses.
//!
//! RULE: No formula reads a threshold from anywhere but ImpactConfig.
//! Presentation state (view toggles) arrives as an explicit
//! FilterConfig argument, never as ambient session state.
//!
//! The numeric defaults are policy choices inherited from the
//! production dashboard, not physical constraints. Revisit them with
//! data, not intuition.

use crate::error::{ImpactError, ImpactResult};
use serde::{Deserialize, Serialize};

/// Measurement horizons the engine accepts, in days.
pub const HORIZON_CHOICES: [i64; 5] = [7, 14, 30, 60, 90];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactConfig {
    /// After-window length in days. Must be one of HORIZON_CHOICES.
    pub horizon_days: i64,

    /// Days past the horizon before an action counts as mature.
    /// Lets late-arriving conversion data settle.
    pub maturity_buffer_days: i64,

    /// Validation band: observed after-CPC within ±this percent of the
    /// intended bid counts as Validated.
    pub cpc_tolerance_pct: f64,

    /// CPC swings beyond this percent are treated as unreliable
    /// (low-data flag; kept in raw totals, dropped from the matrix).
    pub extreme_cpc_swing_pct: f64,

    /// Before-windows with fewer clicks than this cannot support a
    /// counterfactual; their decision impact is zeroed.
    pub min_clicks_for_baseline: f64,

    /// Click count at which a record earns full confidence weight.
    pub full_confidence_clicks: f64,

    /// Minimum after-clicks before bid validation can say anything.
    pub min_clicks_for_validation: f64,

    /// Minimum fraction of the horizon the after-window must cover;
    /// below this the record is tagged insufficient_data and skipped.
    pub min_after_coverage: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            horizon_days: 14,
            maturity_buffer_days: 3,
            cpc_tolerance_pct: 30.0,
            extreme_cpc_swing_pct: 200.0,
            min_clicks_for_baseline: 5.0,
            full_confidence_clicks: 15.0,
            min_clicks_for_validation: 5.0,
            min_after_coverage: 0.5,
        }
    }
}

impl ImpactConfig {
    pub fn with_horizon(days: i64) -> ImpactResult<Self> {
        if !HORIZON_CHOICES.contains(&days) {
            return Err(ImpactError::UnsupportedHorizon { days });
        }
        Ok(Self {
            horizon_days: days,
            ..Self::default()
        })
    }
}

/// View-level filters, passed explicitly into the aggregator.
///
/// Every screen that displays the canonical numbers constructs one of
/// these and passes it down; two screens with the same FilterConfig
/// are guaranteed the same numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Keep only records whose implementation was confirmed
    /// (Validated or Directional).
    pub validated_only: bool,
    /// Keep only mature, non-dormant records.
    pub mature_only: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            validated_only: true,
            mature_only: true,
        }
    }
}
