//! Deterministic demo-account seeder.
//!
//! RULE: all randomness flows through one Pcg64Mcg stream derived from
//! the CLI seed. Same seed, same database, byte for byte. No platform
//! RNG, no clocks; the data anchors to a fixed calendar.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use impact_core::action::{Action, ActionKind, HarvestProvenance};
use impact_core::snapshot::PerformanceSnapshot;
use impact_core::store::ImpactStore;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use uuid::Uuid;

/// Latest snapshot date in the generated history. Fixed so a given
/// seed always produces the same maturity picture.
const ANCHOR: (i32, u32, u32) = (2026, 6, 30);
const HISTORY_DAYS: i64 = 90;

struct SeedRng {
    inner: Pcg64Mcg,
}

impl SeedRng {
    fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [lo, hi).
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}

struct DemoTarget {
    text: &'static str,
    campaign: &'static str,
    daily_clicks: f64,
    cpc: f64,
    spc: f64,
    /// Multiplier applied to efficiency after the action lands.
    post_action_shift: f64,
    action: Option<(ActionKind, &'static str, Option<f64>, Option<f64>)>,
}

fn demo_targets() -> Vec<DemoTarget> {
    vec![
        DemoTarget {
            text: "ceramic pour over set",
            campaign: "Coffee - Exact",
            daily_clicks: 6.0,
            cpc: 1.10,
            spc: 4.2,
            post_action_shift: 1.25,
            action: Some((ActionKind::BidUp, "strong converter, scale up", Some(1.10), Some(1.35))),
        },
        DemoTarget {
            text: "gooseneck kettle",
            campaign: "Coffee - Exact",
            daily_clicks: 9.0,
            cpc: 0.95,
            spc: 3.1,
            post_action_shift: 1.05,
            action: Some((ActionKind::BidUp, "headroom at current acos", Some(0.95), Some(1.15))),
        },
        DemoTarget {
            text: "coffee filters bulk",
            campaign: "Coffee - Broad",
            daily_clicks: 12.0,
            cpc: 0.80,
            spc: 1.4,
            post_action_shift: 0.90,
            action: Some((ActionKind::BidDown, "acos above target", Some(0.80), Some(0.60))),
        },
        DemoTarget {
            text: "espresso tamper 51mm",
            campaign: "Coffee - Broad",
            daily_clicks: 4.0,
            cpc: 0.70,
            spc: 2.6,
            post_action_shift: 1.0,
            action: None,
        },
        DemoTarget {
            text: "free coffee samples",
            campaign: "Coffee - Broad",
            daily_clicks: 7.0,
            cpc: 0.65,
            spc: 0.0,
            post_action_shift: 0.0,
            action: Some((ActionKind::NegativeAdd, "zero sales at meaningful spend", None, None)),
        },
        DemoTarget {
            text: "cold brew maker glass",
            campaign: "Coffee - Broad",
            daily_clicks: 5.0,
            cpc: 1.05,
            spc: 3.8,
            post_action_shift: 1.15,
            action: Some((ActionKind::Harvest, "proven search term, isolate", None, None)),
        },
        DemoTarget {
            text: "vintage percolator parts",
            campaign: "Coffee - Auto",
            daily_clicks: 2.0,
            cpc: 0.55,
            spc: 0.4,
            post_action_shift: 0.0,
            action: Some((ActionKind::Pause, "chronic underperformer", None, None)),
        },
    ]
}

/// Write a reproducible demo history plus its action log.
pub fn seed_demo(store: &ImpactStore, account_id: &str, seed: u64) -> Result<usize> {
    let mut rng = SeedRng::new(seed);
    let latest = NaiveDate::from_ymd_opt(ANCHOR.0, ANCHOR.1, ANCHOR.2)
        .ok_or_else(|| anyhow::anyhow!("bad anchor date"))?;
    let earliest = latest - Duration::days(HISTORY_DAYS - 1);
    // Old enough to mature at every supported horizon up to 30 days.
    let action_day = latest - Duration::days(35);

    let mut snapshot_rows = 0usize;
    let mut action_rows = 0usize;
    for target in demo_targets() {
        let acted = target.action.is_some();
        let mut day = earliest;
        while day <= latest {
            let post = acted && day > action_day;
            let shift = if post { target.post_action_shift } else { 1.0 };

            // Pauses and confirmed negatives go silent after the action.
            if post && shift == 0.0 {
                day += Duration::days(1);
                continue;
            }

            let clicks = (target.daily_clicks * shift * rng.range(0.6, 1.4)).round();
            if clicks <= 0.0 {
                day += Duration::days(1);
                continue;
            }
            let spend = clicks * target.cpc * rng.range(0.9, 1.1);
            let sales = clicks * target.spc * shift * rng.range(0.7, 1.3);

            let campaign = if post && target.text == "cold brew maker glass" {
                "Coffee - Harvested"
            } else {
                target.campaign
            };
            store.insert_snapshot(
                account_id,
                &PerformanceSnapshot {
                    target_text: target.text.to_string(),
                    campaign_name: campaign.to_string(),
                    date: day,
                    spend,
                    sales,
                    clicks,
                    impressions: clicks * rng.range(15.0, 40.0),
                    orders: (sales / 25.0).round(),
                },
            )?;
            snapshot_rows += 1;
            day += Duration::days(1);
        }

        if let Some((kind, reason, old_value, new_value)) = target.action {
            let provenance = match kind {
                ActionKind::Harvest => Some(HarvestProvenance {
                    source_campaign: target.campaign.to_string(),
                    destination_campaign: "Coffee - Harvested".to_string(),
                }),
                _ => None,
            };
            store.insert_action(
                account_id,
                &Action {
                    id: Uuid::new_v4(),
                    target_text: target.text.to_string(),
                    campaign_name: target.campaign.to_string(),
                    ad_group_name: "Demo".to_string(),
                    kind,
                    old_value,
                    new_value,
                    reason: reason.to_string(),
                    date: action_day,
                    provenance,
                },
            )?;
            action_rows += 1;
        }
    }

    // Fencing negative for the harvested term: zero credit here, the
    // harvest action carries it.
    store.insert_action(
        account_id,
        &Action {
            id: Uuid::new_v4(),
            target_text: "cold brew maker glass".to_string(),
            campaign_name: "Coffee - Broad".to_string(),
            ad_group_name: "Demo".to_string(),
            kind: ActionKind::NegativeAdd,
            old_value: None,
            new_value: None,
            reason: "harvest isolation negative".to_string(),
            date: action_day,
            provenance: None,
        },
    )?;
    action_rows += 1;

    // One fresh action that must show up as pending, never as credit.
    store.insert_action(
        account_id,
        &Action {
            id: Uuid::new_v4(),
            target_text: "gooseneck kettle".to_string(),
            campaign_name: "Coffee - Exact".to_string(),
            ad_group_name: "Demo".to_string(),
            kind: ActionKind::BidDown,
            old_value: Some(1.15),
            new_value: Some(1.00),
            reason: "efficiency check".to_string(),
            date: latest - Duration::days(4),
            provenance: None,
        },
    )?;
    action_rows += 1;

    log::info!("seeded {account_id}: {snapshot_rows} snapshot rows, {action_rows} actions");
    Ok(snapshot_rows)
}
