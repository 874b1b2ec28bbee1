//! ROAS waterfall decomposer — baseline → market → decisions → actual.
//!
//! A presentation reconciliation, not a second estimation method. The
//! decisions step comes from the canonical aggregator; the market step
//! is the residual, so the three deltas always balance by construction:
//!
//!   market_delta + decisions_delta == actual − baseline

use crate::metrics::ImpactMetrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoasWaterfall {
    /// Efficiency ratio (sales/spend) over the reference period.
    pub baseline: f64,
    /// External movement: everything the engine did not isolate.
    pub market_delta: f64,
    /// Attributed impact expressed in efficiency-ratio units.
    pub decisions_delta: f64,
    /// Efficiency ratio actually observed this period.
    pub actual: f64,
}

pub fn roas_waterfall(
    baseline_ratio: f64,
    actual_ratio: f64,
    metrics: &ImpactMetrics,
) -> RoasWaterfall {
    let decisions_delta = if metrics.total_spend > 0.0 {
        metrics.attributed_impact / metrics.total_spend
    } else {
        0.0
    };
    let market_delta = actual_ratio - baseline_ratio - decisions_delta;

    RoasWaterfall {
        baseline: baseline_ratio,
        market_delta,
        decisions_delta,
        actual: actual_ratio,
    }
}

impl RoasWaterfall {
    /// The residual construction guarantees this; exposed so callers
    /// and tests can assert it cheaply.
    pub fn balances(&self, tolerance: f64) -> bool {
        let reconstructed = self.baseline + self.market_delta + self.decisions_delta;
        (reconstructed - self.actual).abs() <= tolerance
    }
}
