//! ImpactMetrics — the canonical aggregator.
//!
//! RULE: This is the ONLY place portfolio-level impact numbers are
//! computed. Every screen, report, and assistant answer reads from one
//! instantiation of this reducer; nothing recomputes ad hoc.
//!
//! The contract is strict determinism: same record collection, same
//! filter, same horizon → bit-identical output. No clocks, no session
//! state, no call-order dependence.
//!
//! Invariant: offensive_value + defensive_value + gap_value ==
//! attributed_impact, and market_drag_value is never added to it.

use crate::confidence::{classify_confidence, ConfidenceReport};
use crate::config::FilterConfig;
use crate::maturity::MaturityStatus;
use crate::record::{Attribution, ImpactRecord, MarketTag};
use crate::types::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    // ── Core values ────────────────────────────────────────────
    /// The headline "Value Created" number. Market Drag excluded.
    pub attributed_impact: Money,
    /// Raw summed impact over every included record, drag and all.
    pub decision_impact: Money,
    /// attributed_impact / total_spend, in efficiency-ratio units.
    pub decision_impact_roas: f64,

    // ── Quadrant breakdown ─────────────────────────────────────
    pub offensive_value: Money,
    pub defensive_value: Money,
    pub gap_value: Money,
    /// Tracked, shown as an excluded footnote, never summed in.
    pub market_drag_value: Money,
    pub offensive_count: usize,
    pub defensive_count: usize,
    pub gap_count: usize,
    pub drag_count: usize,

    // ── Counts ─────────────────────────────────────────────────
    /// Records included after filtering.
    pub total_actions: usize,
    /// Included records at Mature status.
    pub mature_actions: usize,
    /// Immature records in the input, reported as pending.
    pub pending_actions: usize,
    /// Dormant records in the input (mature but zero traffic).
    pub dormant_actions: usize,

    // ── Spend ──────────────────────────────────────────────────
    /// After-window spend summed across included records.
    pub total_spend: Money,
    /// Confirmed-eliminated waste from cost-avoidance negatives.
    pub capital_protected: Money,
    /// All spend confirmed eliminated (negatives, pauses, killed bids).
    pub spend_avoided: Money,

    // ── Quality ────────────────────────────────────────────────
    pub win_rate: f64,
    pub confidence: ConfidenceReport,

    // ── Provenance ─────────────────────────────────────────────
    pub filters: FilterConfig,
    pub horizon_days: i64,
}

impl ImpactMetrics {
    /// The only place metrics are calculated.
    ///
    /// Returns `None` for an empty input collection: "no actions have
    /// been taken" must stay distinguishable from "actions netted to
    /// zero impact".
    pub fn from_records(
        records: &[ImpactRecord],
        filters: FilterConfig,
        horizon_days: i64,
    ) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let pending_actions = records
            .iter()
            .filter(|r| r.maturity == MaturityStatus::Immature)
            .count();
        let dormant_actions = records
            .iter()
            .filter(|r| r.maturity == MaturityStatus::Dormant)
            .count();

        let included: Vec<&ImpactRecord> = records
            .iter()
            .filter(|r| !filters.mature_only || r.maturity.is_aggregatable())
            .filter(|r| !filters.validated_only || r.validation.is_credited())
            .collect();

        let mut offensive_value = 0.0;
        let mut defensive_value = 0.0;
        let mut gap_value = 0.0;
        let mut market_drag_value = 0.0;
        let mut offensive_count = 0;
        let mut defensive_count = 0;
        let mut gap_count = 0;
        let mut drag_count = 0;
        let mut decision_impact = 0.0;
        let mut total_spend = 0.0;
        let mut capital_protected = 0.0;
        let mut spend_avoided = 0.0;

        for record in &included {
            decision_impact += record.final_impact;
            total_spend += record.after.spend;
            spend_avoided += record.spend_avoided;

            match record.market_tag {
                Some(MarketTag::OffensiveWin) => {
                    offensive_value += record.final_impact;
                    offensive_count += 1;
                }
                Some(MarketTag::DefensiveWin) => {
                    defensive_value += record.final_impact;
                    defensive_count += 1;
                }
                Some(MarketTag::DecisionGap) => {
                    gap_value += record.final_impact;
                    gap_count += 1;
                }
                Some(MarketTag::MarketDrag) => {
                    market_drag_value += record.final_impact;
                    drag_count += 1;
                }
                None => {}
            }

            if record.attribution == Attribution::CostAvoidance && record.after.spend == 0.0 {
                capital_protected += record.before.spend;
            }
        }

        // Market Drag is excluded by design: ambiguous external
        // attribution must never be conflated with decision quality.
        let attributed_impact = offensive_value + defensive_value + gap_value;

        let mature_actions = included
            .iter()
            .filter(|r| r.maturity.is_aggregatable())
            .count();
        let win_rate = if mature_actions > 0 {
            (offensive_count + defensive_count) as f64 / mature_actions as f64
        } else {
            0.0
        };
        let decision_impact_roas = if total_spend > 0.0 {
            attributed_impact / total_spend
        } else {
            0.0
        };

        let confidence = classify_confidence(&included);

        Some(Self {
            attributed_impact,
            decision_impact,
            decision_impact_roas,
            offensive_value,
            defensive_value,
            gap_value,
            market_drag_value,
            offensive_count,
            defensive_count,
            gap_count,
            drag_count,
            total_actions: included.len(),
            mature_actions,
            pending_actions,
            dormant_actions,
            total_spend,
            capital_protected,
            spend_avoided,
            win_rate,
            confidence,
            filters,
            horizon_days,
        })
    }

    /// Winning actions, offensive plus defensive.
    pub fn wins_count(&self) -> usize {
        self.offensive_count + self.defensive_count
    }

    /// Average attributed impact per included action.
    pub fn impact_per_action(&self) -> Money {
        if self.total_actions > 0 {
            self.attributed_impact / self.total_actions as f64
        } else {
            0.0
        }
    }

    /// Serialize for reports, session hand-off, and the assistant.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
