//! Validation gate — was the decision actually implemented?
//!
//! Attribution without implementation is fiction: a bid change the
//! platform never applied cannot be credited. For bids we check the
//! realized after-window CPC against the intended bid; for negatives,
//! harvests, and pauses we check the observable structural effect
//! (spend gone, traffic in the destination).

use crate::action::{Action, ActionKind};
use crate::config::ImpactConfig;
use crate::snapshot::WindowTotals;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Observed value landed within the tolerance band of the intent.
    Validated,
    /// Moved the intended direction but outside tolerance.
    Directional,
    /// Too little after-window signal to judge either way.
    Pending,
    /// Moved against the intent entirely.
    Invalid,
}

impl ValidationStatus {
    /// Statuses the default "Validated Only" view includes.
    pub fn is_credited(&self) -> bool {
        matches!(self, ValidationStatus::Validated | ValidationStatus::Directional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidDirection {
    Up,
    Down,
}

/// Direction the bid was supposed to move. Falls back to comparing the
/// suggested bid against the realized before-CPC when the action log
/// is missing the old value.
pub fn bid_direction(action: &Action, before: &WindowTotals) -> Option<BidDirection> {
    match action.kind {
        ActionKind::BidUp => return Some(BidDirection::Up),
        ActionKind::BidDown => return Some(BidDirection::Down),
        _ => {}
    }
    let new = action.new_value?;
    if let Some(old) = action.old_value {
        return Some(if new < old { BidDirection::Down } else { BidDirection::Up });
    }
    let before_cpc = before.cpc()?;
    if new > before_cpc * 1.05 {
        Some(BidDirection::Up)
    } else if new < before_cpc * 0.95 {
        Some(BidDirection::Down)
    } else {
        None
    }
}

pub fn validate_action(
    action: &Action,
    before: &WindowTotals,
    after: &WindowTotals,
    config: &ImpactConfig,
) -> ValidationStatus {
    match action.kind {
        ActionKind::BidUp | ActionKind::BidDown => validate_bid(action, before, after, config),
        ActionKind::NegativeAdd => {
            if after.spend == 0.0 {
                ValidationStatus::Validated // confirmed blocked
            } else {
                ValidationStatus::Invalid // keyword still spending
            }
        }
        ActionKind::Harvest => {
            // Destination traffic is the observable migration signal.
            if after.spend > 0.0 || after.clicks > 0.0 {
                ValidationStatus::Validated
            } else {
                ValidationStatus::Pending
            }
        }
        ActionKind::Pause => {
            if after.spend == 0.0 {
                ValidationStatus::Validated // confirmed paused
            } else {
                ValidationStatus::Invalid
            }
        }
        ActionKind::Hold => ValidationStatus::Pending,
    }
}

fn validate_bid(
    action: &Action,
    before: &WindowTotals,
    after: &WindowTotals,
    config: &ImpactConfig,
) -> ValidationStatus {
    // Spend driven to zero by a bid-down is a successful elimination,
    // not a missing signal.
    if after.spend == 0.0 && before.spend > 0.0 {
        return match bid_direction(action, before) {
            Some(BidDirection::Down) => ValidationStatus::Validated,
            _ => ValidationStatus::Pending,
        };
    }

    if after.clicks < config.min_clicks_for_validation {
        return ValidationStatus::Pending;
    }
    let observed_cpc = match after.cpc() {
        Some(cpc) => cpc,
        None => return ValidationStatus::Pending,
    };
    let intended = match action.new_value {
        Some(bid) if bid > 0.0 => bid,
        _ => return ValidationStatus::Pending,
    };

    let tolerance = config.cpc_tolerance_pct / 100.0;
    let ratio = observed_cpc / intended;
    if ratio >= 1.0 - tolerance && ratio <= 1.0 + tolerance {
        return ValidationStatus::Validated;
    }

    let direction = match bid_direction(action, before) {
        Some(direction) => direction,
        None => return ValidationStatus::Pending,
    };
    let before_cpc = match before.cpc() {
        Some(cpc) => cpc,
        None => return ValidationStatus::Pending,
    };
    let moved_up = observed_cpc > before_cpc;
    match (direction, moved_up) {
        (BidDirection::Up, true) | (BidDirection::Down, false) => ValidationStatus::Directional,
        _ => ValidationStatus::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn bid_action(kind: ActionKind, old: Option<f64>, new: Option<f64>) -> Action {
        Action {
            id: Uuid::nil(),
            target_text: "kw".into(),
            campaign_name: "C".into(),
            ad_group_name: "AG".into(),
            kind,
            old_value: old,
            new_value: new,
            reason: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            provenance: None,
        }
    }

    fn window(spend: f64, clicks: f64) -> WindowTotals {
        WindowTotals {
            spend,
            clicks,
            ..WindowTotals::default()
        }
    }

    #[test]
    fn cpc_inside_band_validates() {
        let config = ImpactConfig::default();
        let action = bid_action(ActionKind::BidUp, Some(1.0), Some(2.0));
        // after CPC = 2.2, intended 2.0 → ratio 1.1, inside ±30%
        let status = validate_action(&action, &window(10.0, 10.0), &window(22.0, 10.0), &config);
        assert_eq!(status, ValidationStatus::Validated);
    }

    #[test]
    fn right_direction_outside_band_is_directional() {
        let config = ImpactConfig::default();
        let action = bid_action(ActionKind::BidUp, Some(1.0), Some(2.0));
        // before CPC 1.0, after CPC 3.0: up as intended but 50% off the bid
        let status = validate_action(&action, &window(10.0, 10.0), &window(30.0, 10.0), &config);
        assert_eq!(status, ValidationStatus::Directional);
    }

    #[test]
    fn wrong_direction_is_invalid() {
        let config = ImpactConfig::default();
        let action = bid_action(ActionKind::BidUp, Some(1.0), Some(2.0));
        // before CPC 1.0, after CPC 0.5: fell although a raise was intended
        let status = validate_action(&action, &window(10.0, 10.0), &window(5.0, 10.0), &config);
        assert_eq!(status, ValidationStatus::Invalid);
    }

    #[test]
    fn thin_after_window_is_pending() {
        let config = ImpactConfig::default();
        let action = bid_action(ActionKind::BidUp, Some(1.0), Some(2.0));
        let status = validate_action(&action, &window(10.0, 10.0), &window(4.0, 2.0), &config);
        assert_eq!(status, ValidationStatus::Pending);
    }

    #[test]
    fn bid_down_to_zero_spend_is_validated() {
        let config = ImpactConfig::default();
        let action = bid_action(ActionKind::BidDown, Some(2.0), Some(0.5));
        let status = validate_action(&action, &window(10.0, 10.0), &window(0.0, 0.0), &config);
        assert_eq!(status, ValidationStatus::Validated);
    }
}
