//! Converts externally observed balances into synthetic ledger events.

use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::connections::connections_model::{Connection, ObservedBalance};
use crate::holdings::{HoldingOrigin, HoldingRepositoryTrait, HoldingsServiceTrait, NewHolding};
use crate::ledger::{LedgerEvent, LedgerServiceTrait, TradeDirection};
use crate::Result;

/// Reconciles an observed wallet/exchange balance against the projected
/// ledger balance, emitting a buy for a positive delta and a sell for a
/// negative one. Sells are subject to the standard write-time validation.
pub struct ConnectionReconciler {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    holdings_service: Arc<dyn HoldingsServiceTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
}

impl ConnectionReconciler {
    pub fn new(
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        holdings_service: Arc<dyn HoldingsServiceTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
    ) -> Self {
        Self {
            holding_repository,
            holdings_service,
            ledger_service,
        }
    }

    /// Reconciles one observed balance as of `date`. Returns the synthetic
    /// event, or `None` when the ledger already matches the observation.
    pub async fn reconcile(
        &self,
        connection: &Connection,
        balance: &ObservedBalance,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Option<LedgerEvent>> {
        let holding = match self
            .holding_repository
            .find_by_connection_symbol(&connection.id, &balance.symbol)?
        {
            Some(holding) => holding,
            None => {
                if balance.quantity <= Decimal::ZERO {
                    return Ok(None);
                }
                let holding = self
                    .holdings_service
                    .create_holding(
                        NewHolding {
                            holder_id: connection.holder_id.clone(),
                            symbol: balance.symbol.clone(),
                            asset_class: balance.asset_class,
                            origin: HoldingOrigin::Connection(connection.id.clone()),
                            periodic_quantity: None,
                        },
                        today,
                    )
                    .await?;
                debug!(
                    "Created holding {} for connection {} symbol {}",
                    holding.id, connection.id, balance.symbol
                );
                let event = self
                    .ledger_service
                    .append_event(
                        &holding.id,
                        TradeDirection::Buy,
                        balance.quantity,
                        date,
                        today,
                    )
                    .await?;
                return Ok(Some(event));
            }
        };

        let projected = self.ledger_service.quantity_as_of(&holding.id, date)?;
        let delta = balance.quantity - projected;
        if delta.is_zero() {
            return Ok(None);
        }
        let (direction, quantity) = if delta > Decimal::ZERO {
            (TradeDirection::Buy, delta)
        } else {
            (TradeDirection::Sell, -delta)
        };
        debug!(
            "Reconciling {} {:?} {} against observed {} (projected {})",
            holding.id, direction, quantity, balance.quantity, projected
        );
        let event = self
            .ledger_service
            .append_event(&holding.id, direction, quantity, date, today)
            .await?;
        Ok(Some(event))
    }
}
