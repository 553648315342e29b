//! Repository and service traits for assets and their price history.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::assets_model::{Asset, AssetClass, PriceRecord};
use crate::errors::Result;

/// Trait defining the contract for Asset repository operations.
#[async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_asset(&self, asset_id: &str) -> Result<Asset>;
    fn get_assets(&self) -> Result<Vec<Asset>>;
    async fn upsert_asset(&self, asset: Asset) -> Result<Asset>;

    /// Insert-or-replace price rows, keeping at most one row per (asset, date).
    async fn save_price_records(&self, records: &[PriceRecord]) -> Result<usize>;

    /// Latest history row with `date <= target`, if any.
    fn get_price_at_or_before(&self, asset_id: &str, date: NaiveDate) -> Result<Option<PriceRecord>>;

    /// Ordered history rows for the asset, optionally bounded.
    fn get_price_history(
        &self,
        asset_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceRecord>>;
}

/// Trait defining the contract for Asset service operations.
#[async_trait]
pub trait AssetServiceTrait: Send + Sync {
    fn get_asset(&self, asset_id: &str) -> Result<Asset>;

    /// Returns the asset for (symbol, class), creating it from the provider
    /// on first sight. Creation backfills the asset's daily price history.
    async fn ensure_asset(
        &self,
        symbol: &str,
        class: AssetClass,
        now: DateTime<Utc>,
    ) -> Result<Asset>;

    /// Refreshes the asset's live price if it is older than the staleness
    /// window, and records today's history row. Returns the current asset.
    async fn refresh_price(
        &self,
        asset_id: &str,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Asset>;
}
