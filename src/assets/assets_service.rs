use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::assets::assets_model::{canonical_asset_id, Asset, AssetClass, PriceRecord};
use crate::assets::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
use crate::constants::PRICE_STALENESS_SECS;
use crate::market_data::AssetPriceProviderTrait;
use crate::Result;

/// Service for managing assets and their daily price history.
pub struct AssetService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    price_provider: Arc<dyn AssetPriceProviderTrait>,
}

impl AssetService {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        price_provider: Arc<dyn AssetPriceProviderTrait>,
    ) -> Self {
        Self {
            asset_repository,
            price_provider,
        }
    }

    /// Pulls the provider's full daily series for a freshly created asset.
    /// Provider failure leaves the asset without history; valuation then
    /// falls back to the live price.
    async fn backfill_history(&self, asset: &Asset) -> Result<usize> {
        let samples = match self
            .price_provider
            .price_history(&asset.symbol, asset.asset_class)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(
                    "History backfill unavailable for {}: {}. Continuing without history.",
                    asset.id, e
                );
                return Ok(0);
            }
        };

        let records: Vec<PriceRecord> = samples
            .into_iter()
            .map(|s| PriceRecord {
                asset_id: asset.id.clone(),
                date: s.date,
                price: s.price,
            })
            .collect();
        self.asset_repository.save_price_records(&records).await
    }
}

#[async_trait]
impl AssetServiceTrait for AssetService {
    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        self.asset_repository.get_asset(asset_id)
    }

    async fn ensure_asset(
        &self,
        symbol: &str,
        class: AssetClass,
        now: DateTime<Utc>,
    ) -> Result<Asset> {
        let asset_id = canonical_asset_id(symbol, class);
        if let Ok(existing) = self.asset_repository.get_asset(&asset_id) {
            return Ok(existing);
        }

        let price = match self.price_provider.current_price(symbol, class).await {
            Ok(price) => price,
            Err(e) => {
                warn!(
                    "Live price unavailable for new asset {}: {}. Creating with zero price.",
                    asset_id, e
                );
                Decimal::ZERO
            }
        };

        let asset = self
            .asset_repository
            .upsert_asset(Asset::new(symbol, class, price, now))
            .await?;
        let backfilled = self.backfill_history(&asset).await?;
        debug!(
            "Created asset {} with {} backfilled history rows",
            asset.id, backfilled
        );
        Ok(asset)
    }

    async fn refresh_price(
        &self,
        asset_id: &str,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Asset> {
        let mut asset = self.asset_repository.get_asset(asset_id)?;
        if asset.is_fresh(now, PRICE_STALENESS_SECS) {
            debug!("Price for {} is fresh, skipping provider call", asset_id);
            return Ok(asset);
        }

        let price = self
            .price_provider
            .current_price(&asset.symbol, asset.asset_class)
            .await?;

        asset.current_price = price;
        asset.last_updated = now;
        let asset = self.asset_repository.upsert_asset(asset).await?;

        // One history row per calendar day; a later refresh the same day
        // replaces it so history converges on the day's last observation.
        self.asset_repository
            .save_price_records(&[PriceRecord {
                asset_id: asset.id.clone(),
                date: today,
                price,
            }])
            .await?;
        Ok(asset)
    }
}
