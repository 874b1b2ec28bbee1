//! Full account pass through the real store: seed SQLite fixtures,
//! run the engine, and check the report end to end.

use chrono::{Duration, NaiveDate};
use impact_core::action::{Action, ActionKind};
use impact_core::config::{FilterConfig, ImpactConfig};
use impact_core::engine::ImpactEngine;
use impact_core::error::ImpactError;
use impact_core::maturity::MaturityStatus;
use impact_core::record::{Attribution, MarketTag};
use impact_core::snapshot::PerformanceSnapshot;
use impact_core::store::ImpactStore;
use impact_core::validation::ValidationStatus;
use uuid::Uuid;

const ACCOUNT: &str = "acct-e2e";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn action(target: &str, kind: ActionKind, day: NaiveDate, reason: &str) -> Action {
    Action {
        id: Uuid::new_v4(),
        target_text: target.to_string(),
        campaign_name: "Alpha".to_string(),
        ad_group_name: "Core".to_string(),
        kind,
        old_value: Some(1.0),
        new_value: Some(1.25),
        reason: reason.to_string(),
        date: day,
        provenance: None,
    }
}

fn seed_daily(
    store: &ImpactStore,
    target: &str,
    from: NaiveDate,
    to: NaiveDate,
    spend: f64,
    sales: f64,
    clicks: f64,
) {
    let mut day = from;
    while day <= to {
        store
            .insert_snapshot(
                ACCOUNT,
                &PerformanceSnapshot {
                    target_text: target.to_string(),
                    campaign_name: "Alpha".to_string(),
                    date: day,
                    spend,
                    sales,
                    clicks,
                    impressions: clicks * 20.0,
                    orders: sales / 30.0,
                },
            )
            .unwrap();
        day += Duration::days(1);
    }
}

/// Bid-up winner, a confirmed cost-avoidance negative, and one action
/// too young to grade. The data runs 2026-02-15..2026-03-31.
fn seeded_store() -> ImpactStore {
    let store = ImpactStore::in_memory().unwrap();
    store.migrate().unwrap();

    // Anchors the account's earliest data date.
    seed_daily(
        &store,
        "widget pro",
        date(2026, 2, 15),
        date(2026, 2, 27),
        8.0,
        24.0,
        4.0,
    );
    // Bid-up before window [02-28, 03-14]: CPC 2.00, SPC 6.00.
    seed_daily(
        &store,
        "widget pro",
        date(2026, 2, 28),
        date(2026, 3, 14),
        10.0,
        30.0,
        5.0,
    );
    // After window [03-15, 03-28]: more spend, efficiency beat.
    seed_daily(
        &store,
        "widget pro",
        date(2026, 3, 15),
        date(2026, 3, 31),
        15.0,
        50.0,
        7.0,
    );
    // Wasted-spend term, silent after its negative lands.
    seed_daily(
        &store,
        "mystery gadget",
        date(2026, 2, 28),
        date(2026, 3, 14),
        6.0,
        0.0,
        2.0,
    );

    store
        .insert_action(
            ACCOUNT,
            &action(
                "widget pro",
                ActionKind::BidUp,
                date(2026, 3, 14),
                "scale proven winner",
            ),
        )
        .unwrap();
    store
        .insert_action(
            ACCOUNT,
            &action(
                "mystery gadget",
                ActionKind::NegativeAdd,
                date(2026, 3, 14),
                "zero sales at meaningful spend",
            ),
        )
        .unwrap();
    store
        .insert_action(
            ACCOUNT,
            &action(
                "late mover",
                ActionKind::BidDown,
                date(2026, 3, 25),
                "efficiency slipping",
            ),
        )
        .unwrap();

    store
}

#[test]
fn account_pass_produces_consistent_report() {
    let engine = ImpactEngine::new(seeded_store());
    let config = ImpactConfig::default();
    let report = engine
        .run_account(ACCOUNT, &config, FilterConfig::default())
        .unwrap();

    assert_eq!(report.account_id, ACCOUNT);
    assert_eq!(report.latest_data_date, date(2026, 3, 31));
    assert_eq!(report.records.len(), 3);

    let metrics = report.metrics.as_ref().expect("metrics present");

    // Only the two mature, credited actions aggregate.
    assert_eq!(metrics.total_actions, 2);
    assert_eq!(metrics.mature_actions, 2);
    assert_eq!(metrics.pending_actions, 1);

    // Bid-up counterfactual: scaled before gives CPC 2.00 / SPC 6.00,
    // expected_sales = (210 / 2) × 6 = 630 against 700 actual.
    assert!((metrics.offensive_value - 70.0).abs() < 1e-6);
    assert_eq!(metrics.offensive_count, 1);
    assert!(
        (metrics.attributed_impact
            - (metrics.offensive_value + metrics.defensive_value + metrics.gap_value))
            .abs()
            < 1e-9
    );

    // Negative eliminated 15 days × 6.00 of waste, scaled to a
    // 14-day-equivalent baseline.
    assert!((metrics.capital_protected - 84.0).abs() < 1e-6);

    assert!((metrics.win_rate - 0.5).abs() < 1e-12);

    let waterfall = report.waterfall.expect("waterfall present");
    assert!(waterfall.balances(1e-9));
    assert!(waterfall.decisions_delta > 0.0);
}

#[test]
fn record_level_verdicts_match_fixture_design() {
    let engine = ImpactEngine::new(seeded_store());
    let report = engine
        .run_account(ACCOUNT, &ImpactConfig::default(), FilterConfig::default())
        .unwrap();

    let bid_up = report
        .records
        .iter()
        .find(|r| r.target_text == "widget pro")
        .unwrap();
    assert_eq!(bid_up.maturity, MaturityStatus::Mature);
    // After-CPC (2.14) overshoots the 1.25 intended bid but moved in
    // the bid's direction.
    assert_eq!(bid_up.validation, ValidationStatus::Directional);
    assert_eq!(bid_up.market_tag, Some(MarketTag::OffensiveWin));
    assert_eq!(bid_up.attribution, Attribution::DirectCausation);
    assert!((bid_up.final_impact - 70.0).abs() < 1e-6);

    let negative = report
        .records
        .iter()
        .find(|r| r.target_text == "mystery gadget")
        .unwrap();
    assert_eq!(negative.validation, ValidationStatus::Validated);
    assert_eq!(negative.attribution, Attribution::CostAvoidance);
    assert_eq!(negative.market_tag, None);
    assert!((negative.spend_avoided - 84.0).abs() < 1e-6);

    let young = report
        .records
        .iter()
        .find(|r| r.target_text == "late mover")
        .unwrap();
    assert_eq!(young.maturity, MaturityStatus::Immature);
    assert!(young.insufficient_data);
    assert_eq!(young.final_impact, 0.0);
}

#[test]
fn unfiltered_view_still_reconciles() {
    let engine = ImpactEngine::new(seeded_store());
    let filters = FilterConfig {
        validated_only: false,
        mature_only: false,
    };
    let report = engine
        .run_account(ACCOUNT, &ImpactConfig::default(), filters)
        .unwrap();
    let metrics = report.metrics.unwrap();

    assert_eq!(metrics.total_actions, 3);
    assert!(
        (metrics.attributed_impact
            - (metrics.offensive_value + metrics.defensive_value + metrics.gap_value))
            .abs()
            < 1e-9
    );
}

#[test]
fn unknown_account_is_a_no_data_error() {
    let engine = ImpactEngine::new(seeded_store());
    let err = engine
        .run_account("acct-missing", &ImpactConfig::default(), FilterConfig::default())
        .unwrap_err();
    assert!(matches!(err, ImpactError::NoData { .. }));
}
