use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::constants::portfolio_epoch;
use crate::errors::Error;
use crate::holdings::HoldingRepositoryTrait;
use crate::ledger::ledger_errors::LedgerError;
use crate::ledger::ledger_model::{LedgerEvent, NewLedgerEvent, TradeDirection};
use crate::ledger::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::ledger::projector;
use crate::portfolio::snapshot::PortfolioHistoryBuilderTrait;
use crate::Result;

/// Service for mutating holding ledgers.
///
/// Mutations to the same holder are serialized: validation, the event
/// write, the cached-quantity refresh, and the forward snapshot rebuild
/// happen under one per-holder lock so snapshots never observe a
/// half-applied ledger. Different holders proceed in parallel.
pub struct LedgerService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    history_builder: Arc<dyn PortfolioHistoryBuilderTrait>,
    holder_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LedgerService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        history_builder: Arc<dyn PortfolioHistoryBuilderTrait>,
    ) -> Self {
        Self {
            ledger_repository,
            holding_repository,
            history_builder,
            holder_locks: DashMap::new(),
        }
    }

    fn holder_lock(&self, holder_id: &str) -> Arc<Mutex<()>> {
        self.holder_locks
            .entry(holder_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Refreshes the holding's cached quantity from its surviving events.
    async fn refresh_cached_quantity(
        &self,
        holding_id: &str,
        events: &[LedgerEvent],
        today: NaiveDate,
    ) -> Result<()> {
        let mut holding = self.holding_repository.get_holding(holding_id)?;
        holding.quantity = projector::quantity_at(events, today);
        self.holding_repository.save_holding(&holding).await
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn append_event(
        &self,
        holding_id: &str,
        direction: TradeDirection,
        quantity: Decimal,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<LedgerEvent> {
        if quantity <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Event quantity must be positive, got {}",
                quantity
            )));
        }
        let epoch = portfolio_epoch();
        if date < epoch {
            return Err(LedgerError::InvalidDate { date, epoch }.into());
        }

        let holding = self.holding_repository.get_holding(holding_id)?;
        let lock = self.holder_lock(&holding.holder_id);
        let _guard = lock.lock().await;

        let events = self.ledger_repository.get_events_by_holding(holding_id)?;
        if direction == TradeDirection::Sell {
            // A backdated sell is validated against the balance as of its
            // own date, not the final balance.
            let balance = projector::quantity_at(&events, date);
            if balance < quantity {
                return Err(LedgerError::QuantityBelowZero {
                    date,
                    balance,
                    requested: quantity,
                }
                .into());
            }
        }

        let event = self
            .ledger_repository
            .insert_event(NewLedgerEvent {
                holding_id: holding_id.to_string(),
                direction,
                quantity,
                effective_date: date,
            })
            .await?;
        debug!(
            "Appended {:?} {} to holding {} effective {}",
            direction, quantity, holding_id, date
        );

        let mut events = events;
        events.push(event.clone());
        self.refresh_cached_quantity(holding_id, &events, today).await?;

        let holding = self.holding_repository.get_holding(holding_id)?;
        self.history_builder
            .rebuild_forward(&holding, date, today)
            .await?;
        Ok(event)
    }

    async fn delete_event(&self, event_id: &str, today: NaiveDate) -> Result<LedgerEvent> {
        let event = self.ledger_repository.get_event(event_id)?;
        let holding = self.holding_repository.get_holding(&event.holding_id)?;
        let lock = self.holder_lock(&holding.holder_id);
        let _guard = lock.lock().await;

        let surviving: Vec<LedgerEvent> = self
            .ledger_repository
            .get_events_by_holding(&event.holding_id)?
            .into_iter()
            .filter(|e| e.id != event.id)
            .collect();
        // Deleting a buy whose quantity a later sell already consumed would
        // drive some date's balance negative.
        if let Some(date) = projector::first_negative_date(&surviving) {
            let balance = projector::quantity_at(&surviving, date);
            return Err(LedgerError::QuantityBelowZero {
                date,
                balance,
                requested: event.quantity,
            }
            .into());
        }

        let deleted = self.ledger_repository.delete_event(event_id).await?;
        self.refresh_cached_quantity(&event.holding_id, &surviving, today)
            .await?;

        let holding = self.holding_repository.get_holding(&event.holding_id)?;
        self.history_builder
            .rebuild_forward(&holding, deleted.effective_date, today)
            .await?;
        Ok(deleted)
    }

    fn quantity_as_of(&self, holding_id: &str, date: NaiveDate) -> Result<Decimal> {
        let events = self.ledger_repository.get_events_by_holding(holding_id)?;
        Ok(projector::quantity_at(&events, date))
    }
}
