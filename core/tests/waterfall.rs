//! Waterfall decomposition tests: the three deltas must always
//! reconcile to the observed ratio, whatever the inputs.

use chrono::NaiveDate;
use impact_core::action::ActionKind;
use impact_core::config::FilterConfig;
use impact_core::maturity::MaturityStatus;
use impact_core::metrics::ImpactMetrics;
use impact_core::record::{Attribution, ImpactRecord, MarketTag, MatchScope};
use impact_core::snapshot::WindowTotals;
use impact_core::validation::ValidationStatus;
use impact_core::waterfall::roas_waterfall;
use uuid::Uuid;

fn credited_record(impact: f64, after_spend: f64) -> ImpactRecord {
    ImpactRecord {
        action_id: Uuid::new_v4(),
        target_text: "kw".into(),
        campaign_name: "Alpha".into(),
        kind: ActionKind::BidUp,
        action_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        before: WindowTotals {
            spend: 100.0,
            sales: 300.0,
            clicks: 50.0,
            ..WindowTotals::default()
        },
        after: WindowTotals {
            spend: after_spend,
            sales: 500.0,
            clicks: 70.0,
            ..WindowTotals::default()
        },
        before_days: 14,
        after_days: 14,
        match_scope: MatchScope::Campaign,
        maturity: MaturityStatus::Mature,
        validation: ValidationStatus::Validated,
        expected_sales: Some(450.0),
        expected_trend_pct: Some(50.0),
        actual_trend_pct: Some(66.7),
        vs_expectation_pct: Some(11.1),
        market_tag: Some(MarketTag::OffensiveWin),
        attribution: Attribution::DirectCausation,
        decision_impact: impact,
        confidence_weight: 1.0,
        final_impact: impact,
        spend_avoided: 0.0,
        insufficient_data: false,
        insufficient_baseline: false,
        low_data: false,
        market_downshift: false,
    }
}

#[test]
fn waterfall_balances_by_construction() {
    let records = vec![
        credited_record(50.0, 150.0),
        credited_record(-20.0, 400.0),
        credited_record(120.0, 950.0),
    ];
    let metrics = ImpactMetrics::from_records(&records, FilterConfig::default(), 14).unwrap();

    let waterfall = roas_waterfall(2.8, 3.1, &metrics);

    assert!(waterfall.balances(1e-9));
    assert_eq!(waterfall.baseline, 2.8);
    assert_eq!(waterfall.actual, 3.1);
}

#[test]
fn decisions_delta_is_attributed_impact_over_spend() {
    let records = vec![credited_record(150.0, 500.0)];
    let metrics = ImpactMetrics::from_records(&records, FilterConfig::default(), 14).unwrap();

    let waterfall = roas_waterfall(2.0, 2.5, &metrics);

    assert!((waterfall.decisions_delta - 150.0 / 500.0).abs() < 1e-12);
    // The market step absorbs whatever decisions did not explain.
    assert!((waterfall.market_delta - (2.5 - 2.0 - 0.3)).abs() < 1e-12);
}

#[test]
fn market_can_fall_while_decisions_gain() {
    // Account got worse overall even though the credited actions won.
    let records = vec![credited_record(80.0, 200.0)];
    let metrics = ImpactMetrics::from_records(&records, FilterConfig::default(), 14).unwrap();

    let waterfall = roas_waterfall(3.0, 2.6, &metrics);

    assert!(waterfall.decisions_delta > 0.0);
    assert!(waterfall.market_delta < 0.0);
    assert!(waterfall.balances(1e-9));
}

#[test]
fn zero_spend_yields_zero_decisions_delta() {
    let records = vec![credited_record(40.0, 0.0)];
    let metrics = ImpactMetrics::from_records(&records, FilterConfig::default(), 14).unwrap();

    let waterfall = roas_waterfall(2.0, 2.0, &metrics);

    assert_eq!(waterfall.decisions_delta, 0.0);
    assert!(waterfall.balances(1e-9));
}
