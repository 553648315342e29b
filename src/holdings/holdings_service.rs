use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;

use crate::assets::AssetServiceTrait;
use crate::holdings::holdings_model::{Holding, NewHolding};
use crate::holdings::holdings_traits::{HoldingRepositoryTrait, HoldingsServiceTrait};
use crate::portfolio::snapshot::PortfolioHistoryBuilderTrait;
use crate::Result;

/// Service for managing holdings.
pub struct HoldingsService {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    asset_service: Arc<dyn AssetServiceTrait>,
    history_builder: Arc<dyn PortfolioHistoryBuilderTrait>,
}

impl HoldingsService {
    pub fn new(
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        asset_service: Arc<dyn AssetServiceTrait>,
        history_builder: Arc<dyn PortfolioHistoryBuilderTrait>,
    ) -> Self {
        Self {
            holding_repository,
            asset_service,
            history_builder,
        }
    }
}

#[async_trait]
impl HoldingsServiceTrait for HoldingsService {
    fn get_holding(&self, holding_id: &str) -> Result<Holding> {
        self.holding_repository.get_holding(holding_id)
    }

    fn get_holdings_by_holder(&self, holder_id: &str) -> Result<Vec<Holding>> {
        self.holding_repository.get_holdings_by_holder(holder_id)
    }

    async fn create_holding(&self, new_holding: NewHolding, today: NaiveDate) -> Result<Holding> {
        self.asset_service
            .ensure_asset(&new_holding.symbol, new_holding.asset_class, Utc::now())
            .await?;
        self.history_builder
            .seed_bootstrap(&new_holding.holder_id, today)
            .await?;
        let holding = self.holding_repository.create_holding(new_holding, today).await?;
        debug!("Created holding {} for holder {}", holding.id, holding.holder_id);
        Ok(holding)
    }

    async fn delete_holding(&self, holding_id: &str, today: NaiveDate) -> Result<()> {
        let holding = self.holding_repository.get_holding(holding_id)?;
        self.history_builder.delete_holding(&holding, today).await
    }
}
