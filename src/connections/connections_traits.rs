use async_trait::async_trait;

use super::connections_model::{Connection, ObservedBalance};
use crate::errors::Result;

/// Boundary to the external wallet/exchange balance reader. Real readers
/// live outside this crate.
#[async_trait]
pub trait BalanceProviderTrait: Send + Sync {
    /// Current balances held at the external source.
    /// `MarketDataError::ProviderUnavailable` on failure; the caller then
    /// marks the connection invalid and stops scheduling it.
    async fn current_balances(&self, connection: &Connection) -> Result<Vec<ObservedBalance>>;
}

/// Trait defining the contract for Connection repository operations.
#[async_trait]
pub trait ConnectionRepositoryTrait: Send + Sync {
    fn get_connection(&self, connection_id: &str) -> Result<Connection>;
    fn get_active_connections(&self) -> Result<Vec<Connection>>;
    async fn save_connection(&self, connection: &Connection) -> Result<()>;
    async fn mark_invalid(&self, connection_id: &str) -> Result<()>;
}
