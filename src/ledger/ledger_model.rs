//! Ledger event domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    /// Sign applied to the event quantity when projecting balances.
    pub fn sign(&self) -> Decimal {
        match self {
            TradeDirection::Buy => Decimal::ONE,
            TradeDirection::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

/// One signed quantity event in a holding's ledger. Immutable once created,
/// except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub id: String,
    pub holding_id: String,
    pub direction: TradeDirection,
    /// Positive quantity, scale 8.
    pub quantity: Decimal,
    pub effective_date: NaiveDate,
}

impl LedgerEvent {
    /// Quantity with the direction's sign applied.
    pub fn signed_quantity(&self) -> Decimal {
        self.direction.sign() * self.quantity
    }
}

/// Payload for creating a ledger event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLedgerEvent {
    pub holding_id: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub effective_date: NaiveDate,
}
