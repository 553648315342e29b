//! Shared test fixtures: fake providers and a fully wired service graph
//! over the in-memory repositories.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::assets::{
    canonical_asset_id, Asset, AssetClass, AssetRepositoryTrait, AssetService, PriceRecord,
};
use crate::connections::{
    BalanceProviderTrait, Connection, ConnectionReconciler, ConnectionStatus, ObservedBalance,
};
use crate::errors::Error;
use crate::holdings::{Holding, HoldingOrigin, HoldingsService, HoldingsServiceTrait, NewHolding};
use crate::ledger::LedgerService;
use crate::market_data::{AssetPriceProviderTrait, MarketDataError, PriceSample};
use crate::portfolio::snapshot::PortfolioHistoryBuilder;
use crate::portfolio::statistics::StatisticsService;
use crate::portfolio::valuation::ValuationService;
use crate::storage::{
    InMemoryAssetRepository, InMemoryConnectionRepository, InMemoryHoldingRepository,
    InMemoryLedgerRepository, InMemorySnapshotRepository,
};
use crate::Result;

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Scripted price provider.
#[derive(Default)]
pub struct FakePriceProvider {
    current: RwLock<HashMap<String, Decimal>>,
    history: RwLock<HashMap<String, Vec<PriceSample>>>,
    unavailable: RwLock<bool>,
}

impl FakePriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current(&self, symbol: &str, class: AssetClass, price: Decimal) {
        self.current
            .write()
            .unwrap()
            .insert(canonical_asset_id(symbol, class), price);
    }

    pub fn push_history(&self, symbol: &str, class: AssetClass, date: NaiveDate, price: Decimal) {
        self.history
            .write()
            .unwrap()
            .entry(canonical_asset_id(symbol, class))
            .or_default()
            .push(PriceSample { date, price });
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().unwrap() = unavailable;
    }

    fn check_available(&self) -> Result<()> {
        if *self.unavailable.read().unwrap() {
            return Err(Error::MarketData(MarketDataError::ProviderUnavailable(
                "scripted outage".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetPriceProviderTrait for FakePriceProvider {
    async fn current_price(&self, symbol: &str, class: AssetClass) -> Result<Decimal> {
        self.check_available()?;
        self.current
            .read()
            .unwrap()
            .get(&canonical_asset_id(symbol, class))
            .copied()
            .ok_or_else(|| Error::MarketData(MarketDataError::NotFound(symbol.to_string())))
    }

    async fn price_at(&self, symbol: &str, class: AssetClass, date: NaiveDate) -> Result<Decimal> {
        self.check_available()?;
        self.history
            .read()
            .unwrap()
            .get(&canonical_asset_id(symbol, class))
            .and_then(|samples| {
                samples
                    .iter()
                    .filter(|s| s.date <= date)
                    .max_by_key(|s| s.date)
                    .map(|s| s.price)
            })
            .ok_or_else(|| Error::MarketData(MarketDataError::NotFound(symbol.to_string())))
    }

    async fn price_history(&self, symbol: &str, class: AssetClass) -> Result<Vec<PriceSample>> {
        self.check_available()?;
        Ok(self
            .history
            .read()
            .unwrap()
            .get(&canonical_asset_id(symbol, class))
            .cloned()
            .unwrap_or_default())
    }
}

/// Scripted balance provider.
#[derive(Default)]
pub struct FakeBalanceProvider {
    balances: RwLock<HashMap<String, Vec<ObservedBalance>>>,
    failing: RwLock<bool>,
}

impl FakeBalanceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balances(&self, connection_id: &str, balances: Vec<ObservedBalance>) {
        self.balances
            .write()
            .unwrap()
            .insert(connection_id.to_string(), balances);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.write().unwrap() = failing;
    }
}

#[async_trait]
impl BalanceProviderTrait for FakeBalanceProvider {
    async fn current_balances(&self, connection: &Connection) -> Result<Vec<ObservedBalance>> {
        if *self.failing.read().unwrap() {
            return Err(Error::MarketData(MarketDataError::ProviderUnavailable(
                "scripted outage".to_string(),
            )));
        }
        Ok(self
            .balances
            .read()
            .unwrap()
            .get(&connection.id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Fully wired engine over in-memory storage.
pub struct TestContext {
    pub asset_repository: Arc<InMemoryAssetRepository>,
    pub ledger_repository: Arc<InMemoryLedgerRepository>,
    pub holding_repository: Arc<InMemoryHoldingRepository>,
    pub snapshot_repository: Arc<InMemorySnapshotRepository>,
    pub connection_repository: Arc<InMemoryConnectionRepository>,
    pub price_provider: Arc<FakePriceProvider>,
    pub balance_provider: Arc<FakeBalanceProvider>,
    pub asset_service: Arc<AssetService>,
    pub valuation_service: Arc<ValuationService>,
    pub history_builder: Arc<PortfolioHistoryBuilder>,
    pub ledger_service: Arc<LedgerService>,
    pub holdings_service: Arc<HoldingsService>,
    pub statistics_service: Arc<StatisticsService>,
    pub reconciler: Arc<ConnectionReconciler>,
}

impl TestContext {
    pub fn new() -> Self {
        let asset_repository = Arc::new(InMemoryAssetRepository::new());
        let ledger_repository = Arc::new(InMemoryLedgerRepository::new());
        let holding_repository = Arc::new(InMemoryHoldingRepository::new());
        let snapshot_repository = Arc::new(InMemorySnapshotRepository::new());
        let connection_repository = Arc::new(InMemoryConnectionRepository::new());
        let price_provider = Arc::new(FakePriceProvider::new());
        let balance_provider = Arc::new(FakeBalanceProvider::new());

        let asset_service = Arc::new(AssetService::new(
            asset_repository.clone(),
            price_provider.clone(),
        ));
        let valuation_service = Arc::new(ValuationService::new(asset_repository.clone()));
        let history_builder = Arc::new(PortfolioHistoryBuilder::new(
            snapshot_repository.clone(),
            holding_repository.clone(),
            ledger_repository.clone(),
            valuation_service.clone(),
        ));
        let ledger_service = Arc::new(LedgerService::new(
            ledger_repository.clone(),
            holding_repository.clone(),
            history_builder.clone(),
        ));
        let holdings_service = Arc::new(HoldingsService::new(
            holding_repository.clone(),
            asset_service.clone(),
            history_builder.clone(),
        ));
        let statistics_service = Arc::new(StatisticsService::new(
            holding_repository.clone(),
            ledger_repository.clone(),
            asset_repository.clone(),
            valuation_service.clone(),
        ));
        let reconciler = Arc::new(ConnectionReconciler::new(
            holding_repository.clone(),
            holdings_service.clone(),
            ledger_service.clone(),
        ));

        Self {
            asset_repository,
            ledger_repository,
            holding_repository,
            snapshot_repository,
            connection_repository,
            price_provider,
            balance_provider,
            asset_service,
            valuation_service,
            history_builder,
            ledger_service,
            holdings_service,
            statistics_service,
            reconciler,
        }
    }

    /// Seeds an asset directly into the repository with a live price.
    pub async fn seed_asset(&self, symbol: &str, class: AssetClass, price: Decimal) -> Asset {
        self.price_provider.set_current(symbol, class, price);
        self.asset_repository
            .upsert_asset(Asset::new(symbol, class, price, Utc::now()))
            .await
            .unwrap()
    }

    /// Seeds a daily history row directly into the repository.
    pub async fn seed_price(&self, symbol: &str, class: AssetClass, date: NaiveDate, price: Decimal) {
        self.asset_repository
            .save_price_records(&[PriceRecord {
                asset_id: canonical_asset_id(symbol, class),
                date,
                price,
            }])
            .await
            .unwrap();
    }

    /// Creates a manual holding through the service (bootstrap included).
    pub async fn create_holding(
        &self,
        holder_id: &str,
        symbol: &str,
        class: AssetClass,
        today: NaiveDate,
    ) -> Holding {
        self.holdings_service
            .create_holding(
                NewHolding {
                    holder_id: holder_id.to_string(),
                    symbol: symbol.to_string(),
                    asset_class: class,
                    origin: HoldingOrigin::Manual,
                    periodic_quantity: None,
                },
                today,
            )
            .await
            .unwrap()
    }

    pub fn connection(&self, id: &str, holder_id: &str) -> Connection {
        Connection {
            id: id.to_string(),
            holder_id: holder_id.to_string(),
            kind: crate::connections::ConnectionKind::Wallet,
            status: ConnectionStatus::Active,
            last_synced: None,
        }
    }
}
