//! Performance snapshots — daily aggregates from the storage layer.
//!
//! Immutable once written. The engine sums them into window totals and
//! never writes them back.

use crate::action::normalize_target;
use crate::types::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (target, campaign, date) daily performance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub target_text: String,
    pub campaign_name: String,
    pub date: NaiveDate,
    pub spend: Money,
    pub sales: Money,
    pub clicks: f64,
    pub impressions: f64,
    pub orders: f64,
}

impl PerformanceSnapshot {
    pub fn target_key(&self) -> String {
        normalize_target(&self.target_text)
    }
}

/// Summed performance over one comparison window.
///
/// Clicks stay f64: window normalization scales the before-window by a
/// coverage ratio, which produces fractional counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowTotals {
    pub spend: Money,
    pub sales: Money,
    pub clicks: f64,
    pub impressions: f64,
    pub orders: f64,
}

impl WindowTotals {
    pub fn accumulate(&mut self, snapshot: &PerformanceSnapshot) {
        self.spend += snapshot.spend;
        self.sales += snapshot.sales;
        self.clicks += snapshot.clicks;
        self.impressions += snapshot.impressions;
        self.orders += snapshot.orders;
    }

    /// Scale every total by `ratio`. Used to make an over-covered
    /// before-window comparable to a clipped after-window.
    pub fn scaled(&self, ratio: f64) -> Self {
        Self {
            spend: self.spend * ratio,
            sales: self.sales * ratio,
            clicks: self.clicks * ratio,
            impressions: self.impressions * ratio,
            orders: self.orders * ratio,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.spend == 0.0 && self.sales == 0.0 && self.clicks == 0.0
    }

    /// Cost per click, None when no clicks occurred.
    pub fn cpc(&self) -> Option<f64> {
        (self.clicks > 0.0).then(|| self.spend / self.clicks)
    }

    /// Sales per click, None when no clicks occurred.
    pub fn spc(&self) -> Option<f64> {
        (self.clicks > 0.0).then(|| self.sales / self.clicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(spend: f64, sales: f64, clicks: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            target_text: "t".into(),
            campaign_name: "c".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            spend,
            sales,
            clicks,
            impressions: 0.0,
            orders: 0.0,
        }
    }

    #[test]
    fn totals_accumulate_and_derive_rates() {
        let mut totals = WindowTotals::default();
        totals.accumulate(&snap(10.0, 30.0, 5.0));
        totals.accumulate(&snap(10.0, 30.0, 5.0));
        assert_eq!(totals.spend, 20.0);
        assert_eq!(totals.cpc(), Some(2.0));
        assert_eq!(totals.spc(), Some(6.0));
    }

    #[test]
    fn zero_clicks_yield_no_rates() {
        let totals = WindowTotals::default();
        assert_eq!(totals.cpc(), None);
        assert_eq!(totals.spc(), None);
    }
}
