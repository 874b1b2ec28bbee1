//! ImpactRecord — the engine's per-action derived output.
//!
//! Created fresh on every pass, never persisted. One record carries
//! everything downstream consumers need: the resolved windows, the
//! counterfactual, the gates' verdicts, and the quadrant label.

use crate::action::ActionKind;
use crate::maturity::MaturityStatus;
use crate::snapshot::WindowTotals;
use crate::types::Money;
use crate::validation::ValidationStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Market quadrant, by sign of (expected trend, vs-expectation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTag {
    /// Spend scaled up and beat the baseline-efficiency projection.
    OffensiveWin,
    /// Spend fell externally, but the result beat the reduced projection.
    DefensiveWin,
    /// Spend scaled up but missed the projection: wasted scale.
    DecisionGap,
    /// Spend fell and performance undershot even the reduced projection.
    /// Attribution is ambiguous; never counted as decision credit.
    MarketDrag,
}

/// How the record's impact value was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// Counterfactual delta: after_sales − expected_sales.
    DirectCausation,
    /// Negative confirmed to have eliminated waste; impact = spend saved.
    CostAvoidance,
    /// Negative with nothing to save; zero credit by definition.
    Preventative,
    /// Negative that only fences a harvested term; credit lives on the
    /// harvest action, never here.
    IsolationNegative,
    /// Pause or spend-eliminating bid-down; impact = net effect
    /// (sales lost minus spend saved), outside the quadrant taxonomy.
    StructuralChange,
}

/// How the window resolver matched snapshots for this action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    /// Target matched within the action's own campaign.
    Campaign,
    /// Harvest: before from the winner-source campaign, after from the
    /// destination campaign.
    HarvestProvenance,
    /// Provenance missing; matched across all campaigns. Degraded
    /// confidence; callers can see the fallback.
    UnscopedFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub action_id: Uuid,
    pub target_text: String,
    pub campaign_name: String,
    pub kind: ActionKind,
    pub action_date: NaiveDate,

    // Resolved windows
    pub before: WindowTotals,
    pub after: WindowTotals,
    /// Calendar days of data coverage behind each window.
    pub before_days: i64,
    pub after_days: i64,
    pub match_scope: MatchScope,

    // Gates
    pub maturity: MaturityStatus,
    pub validation: ValidationStatus,

    // Counterfactual
    pub expected_sales: Option<Money>,
    pub expected_trend_pct: Option<f64>,
    pub actual_trend_pct: Option<f64>,
    pub vs_expectation_pct: Option<f64>,
    pub market_tag: Option<MarketTag>,
    pub attribution: Attribution,

    /// Raw decision impact before confidence weighting.
    pub decision_impact: Money,
    /// Linear weight in [0, 1] from before-window click volume.
    pub confidence_weight: f64,
    /// decision_impact × confidence_weight. This is what aggregates.
    pub final_impact: Money,
    /// Spend confirmed eliminated (negatives, pauses, killed bids).
    pub spend_avoided: Money,

    // Data-quality flags. Flags degrade, they never crash.
    /// After-window coverage below the floor; no numbers computed.
    pub insufficient_data: bool,
    /// Before-window clicks below the baseline floor; impact zeroed.
    pub insufficient_baseline: bool,
    /// Extreme CPC swing; excluded from the outcome matrix view.
    pub low_data: bool,
    /// After-CPC fell ≥25% below before-CPC: auction-wide softening.
    pub market_downshift: bool,
}

impl ImpactRecord {
    /// Zero-credit short-circuit records skip the classifier entirely.
    pub fn is_short_circuited(&self) -> bool {
        matches!(
            self.attribution,
            Attribution::Preventative | Attribution::IsolationNegative
        ) || self.insufficient_data
    }

    /// Whether this record belongs in the outcome-matrix visualization.
    pub fn in_outcome_matrix(&self) -> bool {
        self.market_tag.is_some() && !self.low_data
    }
}
