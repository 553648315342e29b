use async_trait::async_trait;
use chrono::NaiveDate;

use super::holdings_model::{Holding, NewHolding};
use crate::errors::Result;

/// Trait defining the contract for Holding repository operations.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    fn get_holding(&self, holding_id: &str) -> Result<Holding>;
    fn get_holdings(&self) -> Result<Vec<Holding>>;
    fn get_holdings_by_holder(&self, holder_id: &str) -> Result<Vec<Holding>>;

    /// The holding reconciled from a connection for a given symbol, if any.
    fn find_by_connection_symbol(
        &self,
        connection_id: &str,
        symbol: &str,
    ) -> Result<Option<Holding>>;

    /// Distinct holder ids, for batch fan-out.
    fn list_holders(&self) -> Result<Vec<String>>;

    async fn create_holding(&self, new_holding: NewHolding, created_at: NaiveDate)
        -> Result<Holding>;
    async fn save_holding(&self, holding: &Holding) -> Result<()>;
    async fn delete_holding(&self, holding_id: &str) -> Result<()>;
}

/// Trait defining the contract for Holding service operations.
#[async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    fn get_holding(&self, holding_id: &str) -> Result<Holding>;
    fn get_holdings_by_holder(&self, holder_id: &str) -> Result<Vec<Holding>>;

    /// Creates a holding, ensuring its asset exists and seeding the
    /// holder's bootstrap snapshots on first use.
    async fn create_holding(&self, new_holding: NewHolding, today: NaiveDate) -> Result<Holding>;

    /// Removes the holding from every snapshot referencing it, recomputes
    /// those totals, and cascade-deletes its ledger.
    async fn delete_holding(&self, holding_id: &str, today: NaiveDate) -> Result<()>;
}
