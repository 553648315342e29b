//! Statistics domain models.
//!
//! Monetary outputs are scale 2; percentages are scale 2 expressed as
//! `value * 100` (so `12.34` means 12.34%).

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::portfolio_epoch;

/// Grouping key for a value distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionGroup {
    AssetClass,
    Symbol,
}

/// One slice of a value distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSlice {
    pub label: String,
    /// Group value, scale 2.
    pub value: Decimal,
    /// Share of total value, scale 2, `x100` form.
    pub percentage: Decimal,
}

/// Reporting window for the daily profit/loss history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryWindow {
    Weekly,
    Monthly,
    Quarterly,
    All,
}

impl HistoryWindow {
    /// First day covered by the window, counting back from `today`.
    /// `All` starts at the product epoch.
    pub fn start_from(&self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            HistoryWindow::Weekly => today.checked_sub_days(Days::new(7)),
            HistoryWindow::Monthly => today.checked_sub_months(Months::new(1)),
            HistoryWindow::Quarterly => today.checked_sub_months(Months::new(3)),
            HistoryWindow::All => Some(portfolio_epoch()),
        };
        start.unwrap_or_else(portfolio_epoch).max(portfolio_epoch())
    }
}

/// One day of aggregate realized+unrealized profit/loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDate,
    /// Profit/loss amount, scale 2.
    pub value: Decimal,
}
