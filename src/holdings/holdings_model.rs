//! Holding domain models.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::{canonical_asset_id, AssetClass};

/// Cadence of a periodic investment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// Whether a plan anchored on `anchor` is due on `date`. Monthly plans
    /// anchored past a short month's end run on the month's last day.
    pub fn is_due(&self, anchor: NaiveDate, date: NaiveDate) -> bool {
        if date <= anchor {
            return false;
        }
        match self {
            Cadence::Daily => true,
            Cadence::Weekly => date.weekday() == anchor.weekday(),
            Cadence::Monthly => {
                let last_dom = days_in_month(date.year(), date.month());
                date.day() == anchor.day().min(last_dom)
            }
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_y, next_m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

/// How a holding came to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "detail")]
pub enum HoldingOrigin {
    /// Entered by hand.
    Manual,
    /// Reconciled from an external wallet/exchange connection.
    Connection(String),
    /// Created by a periodic investment plan.
    Periodic(Cadence),
}

/// A holder's position in one symbol, derived from its ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub holder_id: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub origin: HoldingOrigin,
    pub created_at: NaiveDate,
    /// Cached `quantity_at(today)`; refreshed after every ledger mutation.
    pub quantity: Decimal,
    /// Fixed buy quantity for periodic holdings.
    pub periodic_quantity: Option<Decimal>,
}

impl Holding {
    /// Canonical id of the asset this holding is a position in.
    pub fn asset_id(&self) -> String {
        canonical_asset_id(&self.symbol, self.asset_class)
    }
}

/// Payload for creating a holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolding {
    pub holder_id: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub origin: HoldingOrigin,
    pub periodic_quantity: Option<Decimal>,
}
