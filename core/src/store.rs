//! SQLite read layer for the storage collaborator's tables.
//!
//! RULE: Only store.rs talks to the database. The engine consumes
//! query results as plain collections and never executes SQL.
//!
//! The engine side of this interface is strictly read-only: actions
//! come from the optimizer's log, snapshots from the uploader. The
//! insert helpers exist for those collaborators (and test fixtures);
//! nothing in the attribution path calls them.

use crate::action::{Action, ActionKind, HarvestProvenance};
use crate::error::{ImpactError, ImpactResult};
use crate::snapshot::PerformanceSnapshot;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

pub struct ImpactStore {
    conn: Connection,
}

impl ImpactStore {
    /// Open (or create) the account database at `path`.
    pub fn open(path: &str) -> ImpactResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and demo seeding).
    pub fn in_memory() -> ImpactResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ImpactResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Read interface consumed by the engine ──────────────────

    pub fn get_actions(&self, account_id: &str) -> ImpactResult<Vec<Action>> {
        let mut stmt = self.conn.prepare(
            "SELECT action_id, target_text, campaign_name, ad_group_name, action_kind,
                    old_value, new_value, reason, action_date,
                    source_campaign, destination_campaign
             FROM actions_log
             WHERE account_id = ?1
             ORDER BY action_date ASC, action_id ASC",
        )?;
        let rows = stmt.query_map(params![account_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<f64>>(5)?,
                row.get::<_, Option<f64>>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, Option<String>>(9)?,
                row.get::<_, Option<String>>(10)?,
            ))
        })?;

        let mut actions = Vec::new();
        for row in rows {
            let (id, target, campaign, ad_group, kind, old_value, new_value, reason, date, src, dst) =
                row?;
            let kind = ActionKind::parse(&kind).ok_or_else(|| {
                ImpactError::Other(anyhow::anyhow!("unknown action kind '{kind}'"))
            })?;
            let provenance = match (src, dst) {
                (Some(source_campaign), Some(destination_campaign)) => Some(HarvestProvenance {
                    source_campaign,
                    destination_campaign,
                }),
                _ => None,
            };
            actions.push(Action {
                id: Uuid::parse_str(&id)
                    .map_err(|e| ImpactError::Other(anyhow::anyhow!("bad action_id: {e}")))?,
                target_text: target,
                campaign_name: campaign,
                ad_group_name: ad_group,
                kind,
                old_value,
                new_value,
                reason,
                date: parse_date("action_date", &date)?,
                provenance,
            });
        }
        Ok(actions)
    }

    pub fn get_snapshots(&self, account_id: &str) -> ImpactResult<Vec<PerformanceSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT target_text, campaign_name, snapshot_date,
                    spend, sales, clicks, impressions, orders
             FROM performance_snapshots
             WHERE account_id = ?1
             ORDER BY snapshot_date ASC, target_text ASC, campaign_name ASC",
        )?;
        let rows = stmt.query_map(params![account_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, f64>(7)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (target, campaign, date, spend, sales, clicks, impressions, orders) = row?;
            snapshots.push(PerformanceSnapshot {
                target_text: target,
                campaign_name: campaign,
                date: parse_date("snapshot_date", &date)?,
                spend,
                sales,
                clicks,
                impressions,
                orders,
            });
        }
        Ok(snapshots)
    }

    pub fn get_latest_snapshot_date(&self, account_id: &str) -> ImpactResult<Option<NaiveDate>> {
        let raw: Option<String> = self.conn.query_row(
            "SELECT MAX(snapshot_date) FROM performance_snapshots WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;
        match raw {
            Some(raw) => Ok(Some(parse_date("snapshot_date", &raw)?)),
            None => Ok(None),
        }
    }

    // ── Write helpers for collaborators and fixtures ───────────

    pub fn insert_action(&self, account_id: &str, action: &Action) -> ImpactResult<()> {
        self.conn.execute(
            "INSERT INTO actions_log
                (action_id, account_id, target_text, campaign_name, ad_group_name,
                 action_kind, old_value, new_value, reason, action_date,
                 source_campaign, destination_campaign)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                action.id.to_string(),
                account_id,
                action.target_text,
                action.campaign_name,
                action.ad_group_name,
                action.kind.as_str(),
                action.old_value,
                action.new_value,
                action.reason,
                action.date.format("%Y-%m-%d").to_string(),
                action.provenance.as_ref().map(|p| p.source_campaign.clone()),
                action
                    .provenance
                    .as_ref()
                    .map(|p| p.destination_campaign.clone()),
            ],
        )?;
        Ok(())
    }

    pub fn insert_snapshot(
        &self,
        account_id: &str,
        snapshot: &PerformanceSnapshot,
    ) -> ImpactResult<()> {
        self.conn.execute(
            "INSERT INTO performance_snapshots
                (account_id, target_text, campaign_name, snapshot_date,
                 spend, sales, clicks, impressions, orders)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                account_id,
                snapshot.target_text,
                snapshot.campaign_name,
                snapshot.date.format("%Y-%m-%d").to_string(),
                snapshot.spend,
                snapshot.sales,
                snapshot.clicks,
                snapshot.impressions,
                snapshot.orders,
            ],
        )?;
        Ok(())
    }
}

fn parse_date(column: &'static str, raw: &str) -> ImpactResult<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        ImpactError::InvalidDate {
            column,
            raw: raw.to_string(),
        }
    })
}
