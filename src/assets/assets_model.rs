//! Asset domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Asset class of a holding or quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Stock,
    Crypto,
    Fiat,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Crypto => "CRYPTO",
            AssetClass::Fiat => "FIAT",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the canonical asset id for a symbol within an asset class,
/// e.g. `STOCK:AAPL` or `CRYPTO:BTC`.
pub fn canonical_asset_id(symbol: &str, class: AssetClass) -> String {
    format!("{}:{}", class.as_str(), symbol.trim().to_uppercase())
}

/// A priced asset, unique per (symbol, asset class).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Canonical id, `<CLASS>:<SYMBOL>`.
    pub id: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    /// Live price, scale 8.
    pub current_price: Decimal,
    /// When `current_price` was last refreshed from the provider.
    pub last_updated: DateTime<Utc>,
}

impl Asset {
    pub fn new(symbol: &str, class: AssetClass, price: Decimal, now: DateTime<Utc>) -> Self {
        Asset {
            id: canonical_asset_id(symbol, class),
            symbol: symbol.trim().to_uppercase(),
            asset_class: class,
            current_price: price,
            last_updated: now,
        }
    }

    /// Whether the live price is still fresh relative to the staleness window.
    pub fn is_fresh(&self, now: DateTime<Utc>, staleness_secs: i64) -> bool {
        now.signed_duration_since(self.last_updated).num_seconds() < staleness_secs
    }
}

/// One historical daily close for an asset. At most one row per (asset, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub asset_id: String,
    pub date: NaiveDate,
    /// Close price, scale 8.
    pub price: Decimal,
}
