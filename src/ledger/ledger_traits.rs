use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ledger_model::{LedgerEvent, NewLedgerEvent, TradeDirection};
use crate::errors::Result;

/// Trait defining the contract for LedgerEvent repository operations.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    fn get_event(&self, event_id: &str) -> Result<LedgerEvent>;

    /// Events for the holding, ordered by effective date ascending.
    fn get_events_by_holding(&self, holding_id: &str) -> Result<Vec<LedgerEvent>>;

    async fn insert_event(&self, new_event: NewLedgerEvent) -> Result<LedgerEvent>;
    async fn delete_event(&self, event_id: &str) -> Result<LedgerEvent>;

    /// Cascade delete when a holding is removed. Returns the number of
    /// events deleted.
    async fn delete_events_by_holding(&self, holding_id: &str) -> Result<usize>;
}

/// Trait defining the contract for ledger mutation operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Validates and appends one event, then rebuilds daily snapshots
    /// forward from its effective date through `today`, as one unit.
    async fn append_event(
        &self,
        holding_id: &str,
        direction: TradeDirection,
        quantity: Decimal,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<LedgerEvent>;

    /// Deletes one event after re-validating that the surviving ledger
    /// never goes negative, then rebuilds forward from the deleted event's
    /// effective date.
    async fn delete_event(&self, event_id: &str, today: NaiveDate) -> Result<LedgerEvent>;

    /// Projected held quantity of the holding as of `date`.
    fn quantity_as_of(&self, holding_id: &str, date: NaiveDate) -> Result<Decimal>;
}
