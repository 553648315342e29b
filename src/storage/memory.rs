//! In-memory repository implementations over `RwLock`ed maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::assets::{Asset, AssetRepositoryTrait, PriceRecord};
use crate::connections::{Connection, ConnectionRepositoryTrait, ConnectionStatus};
use crate::errors::Error;
use crate::holdings::{Holding, HoldingRepositoryTrait, NewHolding};
use crate::ledger::{LedgerEvent, LedgerRepositoryTrait, NewLedgerEvent};
use crate::portfolio::snapshot::{PortfolioSnapshot, SnapshotRepositoryTrait};
use crate::Result;

/// Reads a lock, recovering the inner value if a writer panicked.
fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// === Assets ===

#[derive(Default)]
pub struct InMemoryAssetRepository {
    assets: RwLock<HashMap<String, Asset>>,
    // asset_id -> date -> price; BTreeMap gives at-or-before lookups.
    prices: RwLock<HashMap<String, BTreeMap<NaiveDate, Decimal>>>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetRepositoryTrait for InMemoryAssetRepository {
    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        read_lock(&self.assets)
            .get(asset_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Asset {}", asset_id)))
    }

    fn get_assets(&self) -> Result<Vec<Asset>> {
        Ok(read_lock(&self.assets).values().cloned().collect())
    }

    async fn upsert_asset(&self, asset: Asset) -> Result<Asset> {
        write_lock(&self.assets).insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    async fn save_price_records(&self, records: &[PriceRecord]) -> Result<usize> {
        let mut prices = write_lock(&self.prices);
        for record in records {
            prices
                .entry(record.asset_id.clone())
                .or_default()
                .insert(record.date, record.price);
        }
        Ok(records.len())
    }

    fn get_price_at_or_before(
        &self,
        asset_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PriceRecord>> {
        Ok(read_lock(&self.prices).get(asset_id).and_then(|series| {
            series.range(..=date).next_back().map(|(d, p)| PriceRecord {
                asset_id: asset_id.to_string(),
                date: *d,
                price: *p,
            })
        }))
    }

    fn get_price_history(
        &self,
        asset_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceRecord>> {
        let prices = read_lock(&self.prices);
        let Some(series) = prices.get(asset_id) else {
            return Ok(Vec::new());
        };
        Ok(series
            .iter()
            .filter(|(d, _)| start_date.map_or(true, |s| **d >= s))
            .filter(|(d, _)| end_date.map_or(true, |e| **d <= e))
            .map(|(d, p)| PriceRecord {
                asset_id: asset_id.to_string(),
                date: *d,
                price: *p,
            })
            .collect())
    }
}

// === Ledger ===

#[derive(Default)]
pub struct InMemoryLedgerRepository {
    events: RwLock<HashMap<String, LedgerEvent>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerRepositoryTrait for InMemoryLedgerRepository {
    fn get_event(&self, event_id: &str) -> Result<LedgerEvent> {
        read_lock(&self.events)
            .get(event_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("LedgerEvent {}", event_id)))
    }

    fn get_events_by_holding(&self, holding_id: &str) -> Result<Vec<LedgerEvent>> {
        let mut events: Vec<LedgerEvent> = read_lock(&self.events)
            .values()
            .filter(|e| e.holding_id == holding_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.effective_date
                .cmp(&b.effective_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(events)
    }

    async fn insert_event(&self, new_event: NewLedgerEvent) -> Result<LedgerEvent> {
        let event = LedgerEvent {
            id: Uuid::new_v4().to_string(),
            holding_id: new_event.holding_id,
            direction: new_event.direction,
            quantity: new_event.quantity,
            effective_date: new_event.effective_date,
        };
        write_lock(&self.events).insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn delete_event(&self, event_id: &str) -> Result<LedgerEvent> {
        write_lock(&self.events)
            .remove(event_id)
            .ok_or_else(|| Error::NotFound(format!("LedgerEvent {}", event_id)))
    }

    async fn delete_events_by_holding(&self, holding_id: &str) -> Result<usize> {
        let mut events = write_lock(&self.events);
        let before = events.len();
        events.retain(|_, e| e.holding_id != holding_id);
        Ok(before - events.len())
    }
}

// === Holdings ===

#[derive(Default)]
pub struct InMemoryHoldingRepository {
    holdings: RwLock<HashMap<String, Holding>>,
}

impl InMemoryHoldingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HoldingRepositoryTrait for InMemoryHoldingRepository {
    fn get_holding(&self, holding_id: &str) -> Result<Holding> {
        read_lock(&self.holdings)
            .get(holding_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Holding {}", holding_id)))
    }

    fn get_holdings(&self) -> Result<Vec<Holding>> {
        Ok(read_lock(&self.holdings).values().cloned().collect())
    }

    fn get_holdings_by_holder(&self, holder_id: &str) -> Result<Vec<Holding>> {
        Ok(read_lock(&self.holdings)
            .values()
            .filter(|h| h.holder_id == holder_id)
            .cloned()
            .collect())
    }

    fn find_by_connection_symbol(
        &self,
        connection_id: &str,
        symbol: &str,
    ) -> Result<Option<Holding>> {
        use crate::holdings::HoldingOrigin;
        let wanted = symbol.trim().to_uppercase();
        Ok(read_lock(&self.holdings)
            .values()
            .find(|h| {
                h.symbol == wanted
                    && matches!(&h.origin, HoldingOrigin::Connection(id) if id == connection_id)
            })
            .cloned())
    }

    fn list_holders(&self) -> Result<Vec<String>> {
        let mut holders: Vec<String> = read_lock(&self.holdings)
            .values()
            .map(|h| h.holder_id.clone())
            .collect();
        holders.sort();
        holders.dedup();
        Ok(holders)
    }

    async fn create_holding(
        &self,
        new_holding: NewHolding,
        created_at: NaiveDate,
    ) -> Result<Holding> {
        let holding = Holding {
            id: Uuid::new_v4().to_string(),
            holder_id: new_holding.holder_id,
            symbol: new_holding.symbol.trim().to_uppercase(),
            asset_class: new_holding.asset_class,
            origin: new_holding.origin,
            created_at,
            quantity: Decimal::ZERO,
            periodic_quantity: new_holding.periodic_quantity,
        };
        write_lock(&self.holdings).insert(holding.id.clone(), holding.clone());
        Ok(holding)
    }

    async fn save_holding(&self, holding: &Holding) -> Result<()> {
        write_lock(&self.holdings).insert(holding.id.clone(), holding.clone());
        Ok(())
    }

    async fn delete_holding(&self, holding_id: &str) -> Result<()> {
        write_lock(&self.holdings)
            .remove(holding_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Holding {}", holding_id)))
    }
}

// === Snapshots ===

#[derive(Default)]
pub struct InMemorySnapshotRepository {
    // holder_id -> date -> snapshot
    snapshots: RwLock<HashMap<String, BTreeMap<NaiveDate, PortfolioSnapshot>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for InMemorySnapshotRepository {
    fn get_snapshot(&self, holder_id: &str, date: NaiveDate) -> Result<Option<PortfolioSnapshot>> {
        Ok(read_lock(&self.snapshots)
            .get(holder_id)
            .and_then(|by_date| by_date.get(&date).cloned()))
    }

    fn get_snapshots_by_holder(
        &self,
        holder_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioSnapshot>> {
        let snapshots = read_lock(&self.snapshots);
        let Some(by_date) = snapshots.get(holder_id) else {
            return Ok(Vec::new());
        };
        Ok(by_date
            .values()
            .filter(|s| start_date.map_or(true, |d| s.snapshot_date >= d))
            .filter(|s| end_date.map_or(true, |d| s.snapshot_date <= d))
            .cloned()
            .collect())
    }

    fn get_latest_snapshot_before(
        &self,
        holder_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PortfolioSnapshot>> {
        Ok(read_lock(&self.snapshots).get(holder_id).and_then(|by_date| {
            by_date.range(..date).next_back().map(|(_, s)| s.clone())
        }))
    }

    fn get_snapshots_referencing(&self, holding_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        Ok(read_lock(&self.snapshots)
            .values()
            .flat_map(|by_date| by_date.values())
            .filter(|s| s.holding_ids.contains(holding_id))
            .cloned()
            .collect())
    }

    async fn save_snapshots(&self, snapshots: &[PortfolioSnapshot]) -> Result<()> {
        let mut store = write_lock(&self.snapshots);
        for snapshot in snapshots {
            store
                .entry(snapshot.holder_id.clone())
                .or_default()
                .insert(snapshot.snapshot_date, snapshot.clone());
        }
        Ok(())
    }

    async fn overwrite_snapshots_for_holder_in_range(
        &self,
        holder_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        snapshots_to_save: &[PortfolioSnapshot],
    ) -> Result<()> {
        let mut store = write_lock(&self.snapshots);
        let by_date = store.entry(holder_id.to_string()).or_default();
        by_date.retain(|date, _| *date < start_date || *date > end_date);
        for snapshot in snapshots_to_save {
            by_date.insert(snapshot.snapshot_date, snapshot.clone());
        }
        Ok(())
    }
}

// === Connections ===

#[derive(Default)]
pub struct InMemoryConnectionRepository {
    connections: RwLock<HashMap<String, Connection>>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepositoryTrait for InMemoryConnectionRepository {
    fn get_connection(&self, connection_id: &str) -> Result<Connection> {
        read_lock(&self.connections)
            .get(connection_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Connection {}", connection_id)))
    }

    fn get_active_connections(&self) -> Result<Vec<Connection>> {
        Ok(read_lock(&self.connections)
            .values()
            .filter(|c| c.status == ConnectionStatus::Active)
            .cloned()
            .collect())
    }

    async fn save_connection(&self, connection: &Connection) -> Result<()> {
        write_lock(&self.connections).insert(connection.id.clone(), connection.clone());
        Ok(())
    }

    async fn mark_invalid(&self, connection_id: &str) -> Result<()> {
        let mut connections = write_lock(&self.connections);
        let connection = connections
            .get_mut(connection_id)
            .ok_or_else(|| Error::NotFound(format!("Connection {}", connection_id)))?;
        connection.status = ConnectionStatus::Invalid;
        Ok(())
    }
}
