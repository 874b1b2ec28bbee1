//! Engine orchestration — one pass from raw collections to the report.
//!
//! Data flows one way:
//!   actions + snapshots → window resolver → gates → classifier →
//!   aggregator → waterfall.
//!
//! Every stage is a pure function over immutable inputs; the only I/O
//! is the initial store read. A pass is deterministically recomputable
//! from its inputs; callers may memoize on (account, horizon, filter,
//! data-version), the engine itself never caches.

use crate::action::{Action, ActionKind};
use crate::classifier::classify;
use crate::config::{FilterConfig, ImpactConfig};
use crate::error::{ImpactError, ImpactResult};
use crate::maturity::maturity_status;
use crate::metrics::ImpactMetrics;
use crate::record::{ImpactRecord, MatchScope};
use crate::snapshot::PerformanceSnapshot;
use crate::store::ImpactStore;
use crate::types::AccountId;
use crate::validation::{validate_action, ValidationStatus};
use crate::waterfall::{roas_waterfall, RoasWaterfall};
use crate::window::{resolve_windows, SnapshotIndex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Resolve, gate, and classify every action into an ImpactRecord.
///
/// Hold actions are excluded up front: they changed nothing, so there
/// is no decision to attribute.
pub fn compute_impact_records(
    actions: &[Action],
    snapshots: &[PerformanceSnapshot],
    latest_date: NaiveDate,
    config: &ImpactConfig,
) -> Vec<ImpactRecord> {
    let index = SnapshotIndex::build(snapshots);

    actions
        .iter()
        .filter(|action| action.kind != ActionKind::Hold)
        .map(|action| build_record(action, &index, latest_date, config))
        .collect()
}

fn build_record(
    action: &Action,
    index: &SnapshotIndex<'_>,
    latest_date: NaiveDate,
    config: &ImpactConfig,
) -> ImpactRecord {
    let windows = resolve_windows(action, index, latest_date, config);

    if windows.match_scope == MatchScope::UnscopedFallback {
        log::warn!(
            "harvest '{}' missing provenance; matched unscoped (degraded confidence)",
            action.target_text
        );
    }

    let maturity = maturity_status(
        action.date,
        latest_date,
        &windows.before,
        &windows.after,
        config,
    );
    let validation = if windows.short_circuit.is_some() || windows.insufficient_data {
        ValidationStatus::Pending
    } else {
        validate_action(action, &windows.before, &windows.after, config)
    };
    let outcome = classify(action, &windows, config);

    ImpactRecord {
        action_id: action.id,
        target_text: action.target_text.clone(),
        campaign_name: action.campaign_name.clone(),
        kind: action.kind,
        action_date: action.date,
        before: windows.before,
        after: windows.after,
        before_days: windows.before_days,
        after_days: windows.after_days,
        match_scope: windows.match_scope,
        maturity,
        validation,
        expected_sales: outcome.expected_sales,
        expected_trend_pct: outcome.expected_trend_pct,
        actual_trend_pct: outcome.actual_trend_pct,
        vs_expectation_pct: outcome.vs_expectation_pct,
        market_tag: outcome.market_tag,
        attribution: outcome.attribution,
        decision_impact: outcome.decision_impact,
        confidence_weight: outcome.confidence_weight,
        final_impact: outcome.final_impact,
        spend_avoided: outcome.spend_avoided,
        insufficient_data: windows.insufficient_data,
        insufficient_baseline: outcome.insufficient_baseline,
        low_data: outcome.low_data,
        market_downshift: outcome.market_downshift,
    }
}

/// Presentation-ready result of one full account pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountReport {
    pub account_id: AccountId,
    pub horizon_days: i64,
    pub latest_data_date: NaiveDate,
    pub filters: FilterConfig,
    /// None when the account has actions but the engine produced no
    /// aggregable data, which is distinct from zero impact.
    pub metrics: Option<ImpactMetrics>,
    pub waterfall: Option<RoasWaterfall>,
    pub records: Vec<ImpactRecord>,
}

/// Owns the store handle and runs full account passes.
pub struct ImpactEngine {
    store: ImpactStore,
}

impl ImpactEngine {
    pub fn new(store: ImpactStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ImpactStore {
        &self.store
    }

    /// Load an account's collections and run one attribution pass.
    pub fn run_account(
        &self,
        account_id: &str,
        config: &ImpactConfig,
        filters: FilterConfig,
    ) -> ImpactResult<AccountReport> {
        let latest_date = self
            .store
            .get_latest_snapshot_date(account_id)?
            .ok_or_else(|| ImpactError::NoData {
                account_id: account_id.to_string(),
            })?;
        let actions = self.store.get_actions(account_id)?;
        let snapshots = self.store.get_snapshots(account_id)?;

        let records = compute_impact_records(&actions, &snapshots, latest_date, config);
        let metrics = ImpactMetrics::from_records(&records, filters, config.horizon_days);

        // Account-level efficiency ratios for the waterfall: summed
        // over every record with real windows, independent of view
        // filters, so the baseline doesn't shift when a toggle flips.
        let waterfall = metrics.as_ref().map(|metrics| {
            let (baseline_ratio, actual_ratio) = account_ratios(&records);
            roas_waterfall(baseline_ratio, actual_ratio, metrics)
        });

        if let Some(metrics) = &metrics {
            log::info!(
                "{account_id}: {} records, attributed={:+.2} (off={:+.2} def={:+.2} gap={:+.2} | drag={:+.2} excluded), protected={:.2}, win_rate={:.0}%",
                records.len(),
                metrics.attributed_impact,
                metrics.offensive_value,
                metrics.defensive_value,
                metrics.gap_value,
                metrics.market_drag_value,
                metrics.capital_protected,
                metrics.win_rate * 100.0
            );
        } else {
            log::info!("{account_id}: no records to aggregate");
        }

        Ok(AccountReport {
            account_id: account_id.to_string(),
            horizon_days: config.horizon_days,
            latest_data_date: latest_date,
            filters,
            metrics,
            waterfall,
            records,
        })
    }
}

fn account_ratios(records: &[ImpactRecord]) -> (f64, f64) {
    let mut before_spend = 0.0;
    let mut before_sales = 0.0;
    let mut after_spend = 0.0;
    let mut after_sales = 0.0;
    for record in records {
        if record.is_short_circuited() {
            continue;
        }
        before_spend += record.before.spend;
        before_sales += record.before.sales;
        after_spend += record.after.spend;
        after_sales += record.after.sales;
    }
    let baseline = if before_spend > 0.0 {
        before_sales / before_spend
    } else {
        0.0
    };
    let actual = if after_spend > 0.0 {
        after_sales / after_spend
    } else {
        0.0
    };
    (baseline, actual)
}
