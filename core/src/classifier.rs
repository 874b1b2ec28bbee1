//! Counterfactual classifier — the analytical heart of the engine.
//!
//! The counterfactual asks: had we done nothing, what would the
//! post-action spend level have produced at pre-action efficiency?
//!
//!   cpc_before      = before_spend / before_clicks
//!   spc_before      = before_sales / before_clicks
//!   expected_clicks = after_spend / cpc_before
//!   expected_sales  = expected_clicks × spc_before
//!   decision_impact = after_sales − expected_sales
//!
//! The (expected trend, vs-expectation) sign pair places each record
//! in one of four quadrants. Market Drag is deliberately never folded
//! into decision credit.
//!
//! Every division guards its denominator: a zero denominator yields a
//! null/skipped record, never infinity and never a crash.

use crate::action::{Action, ActionKind};
use crate::config::ImpactConfig;
use crate::record::{Attribution, MarketTag};
use crate::snapshot::WindowTotals;
use crate::types::Money;
use crate::validation::{bid_direction, BidDirection};
use crate::window::ResolvedWindows;

/// Classifier output, merged into the ImpactRecord by the engine.
#[derive(Debug, Clone)]
pub struct Classification {
    pub expected_sales: Option<Money>,
    pub expected_trend_pct: Option<f64>,
    pub actual_trend_pct: Option<f64>,
    pub vs_expectation_pct: Option<f64>,
    pub market_tag: Option<MarketTag>,
    pub attribution: Attribution,
    pub decision_impact: Money,
    pub confidence_weight: f64,
    pub final_impact: Money,
    pub spend_avoided: Money,
    pub insufficient_baseline: bool,
    pub low_data: bool,
    pub market_downshift: bool,
}

impl Classification {
    fn null(attribution: Attribution) -> Self {
        Self {
            expected_sales: None,
            expected_trend_pct: None,
            actual_trend_pct: None,
            vs_expectation_pct: None,
            market_tag: None,
            attribution,
            decision_impact: 0.0,
            confidence_weight: 1.0,
            final_impact: 0.0,
            spend_avoided: 0.0,
            insufficient_baseline: false,
            low_data: false,
            market_downshift: false,
        }
    }
}

pub fn classify(
    action: &Action,
    windows: &ResolvedWindows,
    config: &ImpactConfig,
) -> Classification {
    // Resolver-level short-circuits and thin after-windows carry
    // exactly zero credit; nothing further is computed for them.
    if let Some(attribution) = windows.short_circuit {
        return Classification::null(attribution);
    }
    if windows.insufficient_data {
        return Classification::null(Attribution::DirectCausation);
    }

    let before = &windows.before;
    let after = &windows.after;

    match action.kind {
        ActionKind::NegativeAdd => classify_negative(before, after),
        ActionKind::Pause => classify_pause(before, after),
        _ => classify_counterfactual(action, before, after, config),
    }
}

/// A negative that drove spend to zero saved exactly the before-window
/// waste. "Capital Protected" is a distinct metric, not a quadrant.
fn classify_negative(before: &WindowTotals, after: &WindowTotals) -> Classification {
    let mut result = Classification::null(Attribution::CostAvoidance);
    if after.spend == 0.0 {
        result.decision_impact = before.spend;
        result.final_impact = before.spend;
        result.spend_avoided = before.spend;
    }
    // Still spending: not implemented, nothing avoided. The validation
    // gate marks these Invalid; impact stays zero.
    result
}

/// Pause removes the target from auction. Impact is the net effect:
/// sales lost minus spend saved.
fn classify_pause(before: &WindowTotals, after: &WindowTotals) -> Classification {
    let mut result = Classification::null(Attribution::StructuralChange);
    if after.spend == 0.0 {
        let delta_sales = after.sales - before.sales;
        let delta_spend = after.spend - before.spend;
        result.decision_impact = delta_sales - delta_spend;
        result.final_impact = result.decision_impact;
        result.spend_avoided = before.spend;
    }
    result
}

fn classify_counterfactual(
    action: &Action,
    before: &WindowTotals,
    after: &WindowTotals,
    config: &ImpactConfig,
) -> Classification {
    // Bid-down that eliminated spend entirely is a structural change,
    // not a counterfactual: expected sales at zero spend is zero by
    // construction, which would hide the spend saved.
    if after.spend == 0.0 && before.spend > 0.0 {
        if let Some(BidDirection::Down) = bid_direction(action, before) {
            let mut result = Classification::null(Attribution::StructuralChange);
            let delta_sales = after.sales - before.sales;
            let delta_spend = after.spend - before.spend;
            result.decision_impact = delta_sales - delta_spend;
            result.final_impact = result.decision_impact;
            result.spend_avoided = before.spend;
            return result;
        }
    }

    let mut result = Classification::null(Attribution::DirectCausation);

    let cpc_before = match before.cpc() {
        Some(cpc) if cpc > 0.0 => cpc,
        _ => {
            // No before-clicks: no baseline efficiency exists.
            result.insufficient_baseline = true;
            return result;
        }
    };
    let spc_before = before.spc().unwrap_or(0.0);

    // Baselines from a handful of clicks are statistically meaningless
    // and would swing totals by hundreds; zero them out.
    if before.clicks < config.min_clicks_for_baseline {
        result.insufficient_baseline = true;
        result.confidence_weight =
            (before.clicks / config.full_confidence_clicks).clamp(0.0, 1.0);
        return result;
    }

    let expected_clicks = after.spend / cpc_before;
    let expected_sales = expected_clicks * spc_before;
    let decision_impact = after.sales - expected_sales;
    result.expected_sales = Some(expected_sales);
    result.decision_impact = decision_impact;

    // Quadrant placement needs a before-sales base for the trend
    // percentages; without one the record keeps its impact but stays
    // out of the quadrant taxonomy.
    if before.sales > 0.0 {
        let expected_trend = (expected_sales - before.sales) / before.sales * 100.0;
        let actual_trend = (after.sales - before.sales) / before.sales * 100.0;
        let vs_expectation = actual_trend - expected_trend;
        result.expected_trend_pct = Some(expected_trend);
        result.actual_trend_pct = Some(actual_trend);
        result.vs_expectation_pct = Some(vs_expectation);
        result.market_tag = Some(match (expected_trend >= 0.0, vs_expectation >= 0.0) {
            (true, true) => MarketTag::OffensiveWin,
            (false, true) => MarketTag::DefensiveWin,
            (true, false) => MarketTag::DecisionGap,
            (false, false) => MarketTag::MarketDrag,
        });
    }

    // CPC-swing data-quality flags.
    match after.cpc() {
        Some(cpc_after) => {
            let swing_pct = ((cpc_after - cpc_before) / cpc_before * 100.0).abs();
            result.low_data = swing_pct > config.extreme_cpc_swing_pct;
            result.market_downshift = cpc_after <= 0.75 * cpc_before;
        }
        None => {
            // Spend without clicks is a data anomaly.
            result.low_data = after.spend > 0.0;
        }
    }

    result.confidence_weight = (before.clicks / config.full_confidence_clicks).clamp(0.0, 1.0);
    result.final_impact = result.decision_impact * result.confidence_weight;
    result
}
