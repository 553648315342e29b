//! External connection domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::AssetClass;

/// Kind of external balance source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionKind {
    Wallet,
    Exchange,
}

/// Lifecycle state of a connection. Invalid connections are skipped by the
/// batch scheduler until re-authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Active,
    Invalid,
}

/// A linked wallet or exchange account belonging to one holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub holder_id: String,
    pub kind: ConnectionKind,
    pub status: ConnectionStatus,
    pub last_synced: Option<DateTime<Utc>>,
}

/// One balance observed at the external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedBalance {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub quantity: Decimal,
}
