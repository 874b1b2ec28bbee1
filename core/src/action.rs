//! Action records — the optimizer's decision log, consumed read-only.
//!
//! An Action is immutable once logged. The engine never edits one; it
//! only derives ImpactRecords from them.

use crate::types::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    BidUp,
    BidDown,
    NegativeAdd,
    Harvest,
    Pause,
    Hold,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::BidUp => "bid_up",
            ActionKind::BidDown => "bid_down",
            ActionKind::NegativeAdd => "negative_add",
            ActionKind::Harvest => "harvest",
            ActionKind::Pause => "pause",
            ActionKind::Hold => "hold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bid_up" => Some(ActionKind::BidUp),
            "bid_down" => Some(ActionKind::BidDown),
            "negative_add" | "negative" => Some(ActionKind::NegativeAdd),
            "harvest" => Some(ActionKind::Harvest),
            "pause" => Some(ActionKind::Pause),
            "hold" => Some(ActionKind::Hold),
            _ => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, ActionKind::NegativeAdd)
    }
}

/// Where a harvested term came from and where it went.
///
/// Recorded explicitly by the optimizer at harvest time. When absent
/// (older action logs inferred this from free-text reasons), the
/// window resolver falls back to an unscoped target match and tags the
/// record as degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestProvenance {
    /// Campaign the winning search term previously performed in.
    pub source_campaign: String,
    /// Isolated campaign the term was moved into.
    pub destination_campaign: String,
}

/// One optimization decision, exactly as the optimizer logged it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub target_text: String,
    pub campaign_name: String,
    pub ad_group_name: String,
    pub kind: ActionKind,
    /// Value before the change (e.g. the prior bid), when known.
    pub old_value: Option<Money>,
    /// Intended value after the change (e.g. the suggested bid).
    pub new_value: Option<Money>,
    /// Optimizer reason code, free text.
    pub reason: String,
    pub date: NaiveDate,
    pub provenance: Option<HarvestProvenance>,
}

impl Action {
    /// Reason codes that mark a negative as pure harvest isolation:
    /// it exists only to fence a harvested term into its new home and
    /// carries no independent credit.
    pub fn is_isolation_negative(&self) -> bool {
        if !self.kind.is_negative() {
            return false;
        }
        let reason = self.reason.to_ascii_lowercase();
        reason.contains("isolation") || reason.contains("harvest")
    }

    /// Normalized target key used for snapshot matching.
    pub fn target_key(&self) -> String {
        normalize_target(&self.target_text)
    }
}

/// Case-insensitive, trimmed target normalization shared by actions
/// and snapshots. `asin="..."` wrappers are stripped so product
/// targets match their snapshot rows.
pub fn normalize_target(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    match lowered.strip_prefix("asin=\"") {
        Some(rest) => rest.trim_end_matches('"').to_string(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_asin_wrappers() {
        assert_eq!(normalize_target("ASIN=\"B08XYZ\""), "b08xyz");
        assert_eq!(normalize_target("  Wireless Mouse "), "wireless mouse");
    }

    #[test]
    fn isolation_negative_detected_from_reason() {
        let action = Action {
            id: Uuid::nil(),
            target_text: "wireless mouse".into(),
            campaign_name: "Auto".into(),
            ad_group_name: "AG1".into(),
            kind: ActionKind::NegativeAdd,
            old_value: None,
            new_value: None,
            reason: "Isolation negative for harvested term".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            provenance: None,
        };
        assert!(action.is_isolation_negative());
    }
}
