//! Window resolver — before/after comparison periods for one action.
//!
//! Before spans [action_date − horizon, action_date]; after spans
//! [action_date + 1, action_date + horizon], clipped to the latest
//! available snapshot date.
//!
//! Matching is case-insensitive and trimmed on the target, scoped by
//! campaign where the action type demands isolation:
//!   - bids/pauses match inside the action's own campaign
//!   - negatives match the term across every campaign
//!   - harvests scope before to the winner-source campaign and after
//!     to the destination campaign, with an unscoped fallback when the
//!     provenance was never recorded

use crate::action::{Action, ActionKind};
use crate::config::ImpactConfig;
use crate::record::{Attribution, MatchScope};
use crate::snapshot::{PerformanceSnapshot, WindowTotals};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Snapshots grouped by normalized target, built once per pass so each
/// action resolves against one pre-grouped scan.
pub struct SnapshotIndex<'a> {
    by_target: HashMap<String, Vec<&'a PerformanceSnapshot>>,
    earliest_date: Option<NaiveDate>,
    latest_date: Option<NaiveDate>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn build(snapshots: &'a [PerformanceSnapshot]) -> Self {
        let mut by_target: HashMap<String, Vec<&'a PerformanceSnapshot>> = HashMap::new();
        let mut earliest_date = None;
        let mut latest_date = None;
        for snapshot in snapshots {
            by_target
                .entry(snapshot.target_key())
                .or_default()
                .push(snapshot);
            earliest_date = match earliest_date {
                Some(d) if d <= snapshot.date => Some(d),
                _ => Some(snapshot.date),
            };
            latest_date = match latest_date {
                Some(d) if d >= snapshot.date => Some(d),
                _ => Some(snapshot.date),
            };
        }
        Self {
            by_target,
            earliest_date,
            latest_date,
        }
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.earliest_date
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.latest_date
    }

    /// Sum matching snapshots over [start, end], optionally scoped to
    /// one campaign (case-insensitive, trimmed).
    fn sum(
        &self,
        target_key: &str,
        campaign: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> WindowTotals {
        let campaign_key = campaign.map(|c| c.trim().to_ascii_lowercase());
        let mut totals = WindowTotals::default();
        if let Some(rows) = self.by_target.get(target_key) {
            for snapshot in rows {
                if snapshot.date < start || snapshot.date > end {
                    continue;
                }
                if let Some(ref key) = campaign_key {
                    if snapshot.campaign_name.trim().to_ascii_lowercase() != *key {
                        continue;
                    }
                }
                totals.accumulate(snapshot);
            }
        }
        totals
    }
}

/// The resolver's output: window totals plus everything the resolver
/// alone can decide (short-circuits, coverage, match scope).
#[derive(Debug, Clone)]
pub struct ResolvedWindows {
    pub before: WindowTotals,
    pub after: WindowTotals,
    /// Calendar days of data coverage behind each window.
    pub before_days: i64,
    pub after_days: i64,
    pub match_scope: MatchScope,
    /// Set for zero-credit cases the resolver decides on its own
    /// (isolation negatives, preventative negatives).
    pub short_circuit: Option<Attribution>,
    /// After-window coverage below the configured floor; downstream
    /// computation is suppressed rather than reporting a partial number.
    pub insufficient_data: bool,
}

impl ResolvedWindows {
    fn zeroed(attribution: Attribution) -> Self {
        Self {
            before: WindowTotals::default(),
            after: WindowTotals::default(),
            before_days: 0,
            after_days: 0,
            match_scope: MatchScope::Campaign,
            short_circuit: Some(attribution),
            insufficient_data: false,
        }
    }
}

pub fn resolve_windows(
    action: &Action,
    index: &SnapshotIndex<'_>,
    latest_date: NaiveDate,
    config: &ImpactConfig,
) -> ResolvedWindows {
    // Isolation negatives carry no independent credit: their effect is
    // already counted under the harvest they fence. Decided before any
    // sums so the record cannot pick up accidental totals.
    if action.is_isolation_negative() {
        return ResolvedWindows::zeroed(Attribution::IsolationNegative);
    }

    let horizon = config.horizon_days;
    let target_key = action.target_key();

    let before_start = action.date - Duration::days(horizon);
    let before_end = action.date;
    let after_start = action.date + Duration::days(1);
    let after_end = (action.date + Duration::days(horizon)).min(latest_date);

    let (before, after, match_scope) = match action.kind {
        ActionKind::Harvest => match &action.provenance {
            Some(provenance) => (
                index.sum(
                    &target_key,
                    Some(&provenance.source_campaign),
                    before_start,
                    before_end,
                ),
                index.sum(
                    &target_key,
                    Some(&provenance.destination_campaign),
                    after_start,
                    after_end,
                ),
                MatchScope::HarvestProvenance,
            ),
            None => (
                index.sum(&target_key, None, before_start, before_end),
                index.sum(&target_key, None, after_start, after_end),
                MatchScope::UnscopedFallback,
            ),
        },
        ActionKind::NegativeAdd => (
            // Search terms surface across campaigns; negatives match unscoped.
            index.sum(&target_key, None, before_start, before_end),
            index.sum(&target_key, None, after_start, after_end),
            MatchScope::Campaign,
        ),
        _ => (
            index.sum(
                &target_key,
                Some(&action.campaign_name),
                before_start,
                before_end,
            ),
            index.sum(
                &target_key,
                Some(&action.campaign_name),
                after_start,
                after_end,
            ),
            MatchScope::Campaign,
        ),
    };

    // A negative with no before-spend had nothing to save. Tagged, not
    // credited, not an error.
    if action.kind.is_negative() && before.spend == 0.0 {
        return ResolvedWindows::zeroed(Attribution::Preventative);
    }

    // Coverage in calendar days, bounded by actual account history.
    let after_days = (latest_date - action.date).num_days().clamp(0, horizon);
    let before_days = match index.earliest_date() {
        Some(earliest) => ((action.date - earliest).num_days() + 1).clamp(0, horizon + 1),
        None => 0,
    };

    let insufficient_data = (after_days as f64) < (horizon as f64) * config.min_after_coverage;

    // Symmetrical comparison: scale the before-window down to the
    // after-window's coverage so trend percentages compare like with
    // like. Ratio-derived baselines (CPC, SPC) are scale-invariant.
    let before = if before_days > 0 && after_days > 0 && before_days != after_days {
        before.scaled(after_days as f64 / before_days as f64)
    } else {
        before
    };

    ResolvedWindows {
        before,
        after,
        before_days,
        after_days,
        match_scope,
        short_circuit: None,
        insufficient_data,
    }
}
