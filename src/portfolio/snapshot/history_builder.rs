//! Forward rebuild of daily portfolio snapshots.
//!
//! Every ledger mutation (append, deletion, reconciliation, periodic buy)
//! funnels into [`PortfolioHistoryBuilder::rebuild_forward`], which walks
//! each calendar day from the mutation's effective date through today and
//! re-materializes that day's snapshot: load or carry forward the holding
//! set, replace the mutated holding by identity, recompute the total. The
//! whole range is persisted through one atomic overwrite.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;

use crate::constants::SNAPSHOT_SEED_DAYS;
use crate::holdings::{Holding, HoldingRepositoryTrait};
use crate::ledger::{LedgerEvent, LedgerRepositoryTrait};
use crate::portfolio::snapshot::{
    PortfolioHistoryBuilderTrait, PortfolioSnapshot, SnapshotRepositoryTrait,
};
use crate::portfolio::valuation::{value_of, DailyPriceIndex, ValuationService};
use crate::Result;

/// Builds and repairs the per-day snapshot history of a holder.
pub struct PortfolioHistoryBuilder {
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    valuation_service: Arc<ValuationService>,
}

/// Minimal working set for valuing one holder's snapshots: the holdings,
/// their ledgers, and a pre-fetched price index per distinct asset.
struct WorkingSet {
    holdings: HashMap<String, Holding>,
    events: HashMap<String, Vec<LedgerEvent>>,
    prices: HashMap<String, DailyPriceIndex>,
}

impl WorkingSet {
    /// Total value of the given holding set on `day`, at the valuation
    /// scale. Ids without a loaded holding (deleted concurrently) are
    /// skipped and contribute zero.
    fn total_on(&self, holding_ids: &HashSet<String>, day: NaiveDate, today: NaiveDate) -> Decimal {
        let mut total = Decimal::ZERO;
        for holding_id in holding_ids {
            let Some(holding) = self.holdings.get(holding_id) else {
                debug!("Snapshot references unknown holding {}, skipping", holding_id);
                continue;
            };
            let events = self
                .events
                .get(holding_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if let Some(prices) = self.prices.get(&holding.asset_id()) {
                total += value_of(events, prices, day, today);
            }
        }
        total
    }
}

impl PortfolioHistoryBuilder {
    pub fn new(
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        valuation_service: Arc<ValuationService>,
    ) -> Self {
        Self {
            snapshot_repository,
            holding_repository,
            ledger_repository,
            valuation_service,
        }
    }

    /// Loads the holder's holdings, ledgers, and price indexes. When
    /// `replace` is given, that version of the holding supersedes the
    /// stored one; when `exclude` is given, the holding is dropped from
    /// the set entirely.
    fn load_working_set(
        &self,
        holder_id: &str,
        replace: Option<&Holding>,
        exclude: Option<&str>,
        today: NaiveDate,
    ) -> Result<WorkingSet> {
        let mut holdings: HashMap<String, Holding> = self
            .holding_repository
            .get_holdings_by_holder(holder_id)?
            .into_iter()
            .map(|h| (h.id.clone(), h))
            .collect();
        if let Some(holding) = replace {
            holdings.insert(holding.id.clone(), holding.clone());
        }
        if let Some(holding_id) = exclude {
            holdings.remove(holding_id);
        }

        let mut events = HashMap::new();
        let mut prices = HashMap::new();
        for holding in holdings.values() {
            events.insert(
                holding.id.clone(),
                self.ledger_repository.get_events_by_holding(&holding.id)?,
            );
            let asset_id = holding.asset_id();
            if !prices.contains_key(&asset_id) {
                let index = self.valuation_service.load_price_index(&asset_id, today)?;
                prices.insert(asset_id, index);
            }
        }
        Ok(WorkingSet {
            holdings,
            events,
            prices,
        })
    }

    /// Walks `[from, today]` producing one snapshot per day and overwrites
    /// the range atomically. `ensure` is inserted into every day's holding
    /// set (replace-by-identity); `None` recomputes totals over the
    /// membership already stored or carried forward.
    async fn rebuild_range(
        &self,
        holder_id: &str,
        working_set: &WorkingSet,
        ensure: Option<&str>,
        from: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        if from > today {
            return Ok(());
        }
        let now = Utc::now();

        // Seed the carry-forward chain from the last snapshot before the
        // rebuilt range, or start empty.
        let mut carried: HashSet<String> = self
            .snapshot_repository
            .get_latest_snapshot_before(holder_id, from)?
            .map(|s| s.holding_ids)
            .unwrap_or_default();

        let mut rebuilt = Vec::new();
        for day in from.iter_days().take_while(|d| *d <= today) {
            let mut holding_ids = match self.snapshot_repository.get_snapshot(holder_id, day)? {
                Some(existing) => existing.holding_ids,
                None => carried.clone(),
            };
            if let Some(holding_id) = ensure {
                holding_ids.insert(holding_id.to_string());
            }
            // Deleted holdings must not ride the carry-forward chain.
            holding_ids.retain(|id| working_set.holdings.contains_key(id));

            let total_value = working_set.total_on(&holding_ids, day, today);
            carried = holding_ids.clone();
            rebuilt.push(PortfolioSnapshot {
                id: PortfolioSnapshot::snapshot_id(holder_id, day),
                holder_id: holder_id.to_string(),
                snapshot_date: day,
                holding_ids,
                total_value,
                calculated_at: now,
            });
        }

        self.snapshot_repository
            .overwrite_snapshots_for_holder_in_range(holder_id, from, today, &rebuilt)
            .await
    }
}

#[async_trait]
impl PortfolioHistoryBuilderTrait for PortfolioHistoryBuilder {
    async fn rebuild_forward(
        &self,
        holding: &Holding,
        from: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        debug!(
            "Rebuilding snapshots for holder {} from {} through {}",
            holding.holder_id, from, today
        );
        let working_set =
            self.load_working_set(&holding.holder_id, Some(holding), None, today)?;
        self.rebuild_range(&holding.holder_id, &working_set, Some(&holding.id), from, today)
            .await
    }

    async fn refresh_totals(
        &self,
        holder_id: &str,
        from: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        let working_set = self.load_working_set(holder_id, None, None, today)?;
        self.rebuild_range(holder_id, &working_set, None, from, today)
            .await
    }

    async fn delete_holding(&self, holding: &Holding, today: NaiveDate) -> Result<()> {
        let working_set =
            self.load_working_set(&holding.holder_id, None, Some(&holding.id), today)?;

        let mut affected = self.snapshot_repository.get_snapshots_referencing(&holding.id)?;
        let now = Utc::now();
        for snapshot in &mut affected {
            snapshot.holding_ids.remove(&holding.id);
            snapshot.total_value =
                working_set.total_on(&snapshot.holding_ids, snapshot.snapshot_date, today);
            snapshot.calculated_at = now;
        }
        self.snapshot_repository.save_snapshots(&affected).await?;

        let deleted_events = self
            .ledger_repository
            .delete_events_by_holding(&holding.id)
            .await?;
        self.holding_repository.delete_holding(&holding.id).await?;
        debug!(
            "Deleted holding {} ({} ledger events, {} snapshots scrubbed)",
            holding.id,
            deleted_events,
            affected.len()
        );
        Ok(())
    }

    async fn seed_bootstrap(&self, holder_id: &str, today: NaiveDate) -> Result<()> {
        let existing = self
            .snapshot_repository
            .get_snapshots_by_holder(holder_id, None, None)?;
        if !existing.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let seeds: Vec<PortfolioSnapshot> = (1..=SNAPSHOT_SEED_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(chrono::Days::new(back as u64)))
            .map(|date| PortfolioSnapshot::empty(holder_id, date, now))
            .collect();
        debug!("Seeding {} bootstrap snapshots for holder {}", seeds.len(), holder_id);
        self.snapshot_repository.save_snapshots(&seeds).await
    }
}
