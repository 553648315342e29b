//! Provider boundary for external quote sources.
//!
//! Real providers (HTTP quote APIs) live outside this crate; the engine
//! only depends on this trait and degrades to "price unknown for this
//! cycle" when a call fails.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::market_data_model::PriceSample;
use crate::assets::AssetClass;
use crate::errors::Result;

#[async_trait]
pub trait AssetPriceProviderTrait: Send + Sync {
    /// Live price for the symbol. `MarketDataError::ProviderUnavailable` on
    /// failure or timeout.
    async fn current_price(&self, symbol: &str, class: AssetClass) -> Result<Decimal>;

    /// Daily close for the symbol on a specific date.
    async fn price_at(&self, symbol: &str, class: AssetClass, date: NaiveDate) -> Result<Decimal>;

    /// Full ordered daily price series for the symbol. Used to backfill an
    /// asset's history on first creation.
    async fn price_history(&self, symbol: &str, class: AssetClass) -> Result<Vec<PriceSample>>;
}
