//! impact-runner: headless attribution runner.
//!
//! Usage:
//!   impact-runner --db impact.db --account acct-123
//!   impact-runner --seed-demo --seed 42 --horizon 30
//!   impact-runner --db impact.db --account acct-123 --json

mod seed;

use anyhow::Result;
use impact_core::config::{FilterConfig, ImpactConfig};
use impact_core::engine::{AccountReport, ImpactEngine};
use impact_core::maturity::{days_until_mature, MaturityStatus};
use impact_core::record::MarketTag;
use impact_core::store::ImpactStore;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let horizon = parse_arg(&args, "--horizon", 14i64);
    let seed_demo = args.iter().any(|a| a == "--seed-demo");
    let json_output = args.iter().any(|a| a == "--json");
    let include_unvalidated = args.iter().any(|a| a == "--include-unvalidated");
    let include_immature = args.iter().any(|a| a == "--include-immature");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let account = args
        .windows(2)
        .find(|w| w[0] == "--account")
        .map(|w| w[1].as_str())
        .unwrap_or("demo-account");

    let config = ImpactConfig::with_horizon(horizon)?;
    let filters = FilterConfig {
        validated_only: !include_unvalidated,
        mature_only: !include_immature,
    };

    let store = if db == ":memory:" {
        ImpactStore::in_memory()?
    } else {
        ImpactStore::open(db)?
    };
    store.migrate()?;

    if seed_demo {
        seed::seed_demo(&store, account, seed)?;
    }

    let engine = ImpactEngine::new(store);
    let report = engine.run_account(account, &config, filters)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &AccountReport) {
    println!("=== DECISION IMPACT: {} ===", report.account_id);
    println!("  horizon:      {} days", report.horizon_days);
    println!("  data through: {}", report.latest_data_date);
    println!(
        "  view:         {}{}",
        if report.filters.validated_only {
            "validated-only"
        } else {
            "all-validations"
        },
        if report.filters.mature_only {
            ""
        } else {
            " +immature"
        }
    );
    println!();

    let metrics = match &report.metrics {
        Some(m) => m,
        None => {
            println!("  No actions recorded for this account yet.");
            return;
        }
    };

    println!("  value created:     {:+.2}", metrics.attributed_impact);
    println!(
        "    offensive wins:  {:+.2}  ({})",
        metrics.offensive_value, metrics.offensive_count
    );
    println!(
        "    defensive wins:  {:+.2}  ({})",
        metrics.defensive_value, metrics.defensive_count
    );
    println!(
        "    decision gaps:   {:+.2}  ({})",
        metrics.gap_value, metrics.gap_count
    );
    println!(
        "    market drag:     {:+.2}  ({}) [excluded]",
        metrics.market_drag_value, metrics.drag_count
    );
    println!("  capital protected: {:.2}", metrics.capital_protected);
    println!("  impact roas:       {:+.3}", metrics.decision_impact_roas);
    println!(
        "  win rate:          {:.0}%  ({}/{} mature)",
        metrics.win_rate * 100.0,
        metrics.wins_count(),
        metrics.mature_actions
    );
    println!(
        "  actions:           {} graded, {} pending, {} dormant",
        metrics.total_actions, metrics.pending_actions, metrics.dormant_actions
    );
    println!(
        "  confidence:        {:?} (signal ratio {:.2})",
        metrics.confidence.level, metrics.confidence.signal_ratio
    );

    if let Some(waterfall) = &report.waterfall {
        println!();
        println!("=== ROAS WATERFALL ===");
        println!("  baseline:  {:.3}", waterfall.baseline);
        println!("  market:    {:+.3}", waterfall.market_delta);
        println!("  decisions: {:+.3}", waterfall.decisions_delta);
        println!("  actual:    {:.3}", waterfall.actual);
    }

    println!();
    println!("=== TOP MOVERS ===");
    let mut graded: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.in_outcome_matrix())
        .collect();
    graded.sort_by(|a, b| {
        b.final_impact
            .abs()
            .partial_cmp(&a.final_impact.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if graded.is_empty() {
        println!("  (no graded counterfactual records)");
    }
    for record in graded.iter().take(10) {
        let tag = match record.market_tag {
            Some(MarketTag::OffensiveWin) => "offensive win",
            Some(MarketTag::DefensiveWin) => "defensive win",
            Some(MarketTag::DecisionGap) => "decision gap",
            Some(MarketTag::MarketDrag) => "market drag",
            None => "-",
        };
        println!(
            "  {:+9.2}  {:<14}  {}  [{}]",
            record.final_impact,
            tag,
            record.target_text,
            record.kind.as_str()
        );
    }

    let pending: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.maturity == MaturityStatus::Immature)
        .collect();
    if !pending.is_empty() {
        println!();
        println!("=== PENDING (not yet graded) ===");
        let config = ImpactConfig {
            horizon_days: report.horizon_days,
            ..ImpactConfig::default()
        };
        for record in pending {
            println!(
                "  {}  [{}]  matures in {} days",
                record.target_text,
                record.kind.as_str(),
                days_until_mature(record.action_date, report.latest_data_date, &config)
            );
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
