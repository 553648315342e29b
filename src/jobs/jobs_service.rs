//! Batch driver for the scheduled pipelines.
//!
//! Each job fans out over holders (or connections) and isolates failures:
//! one failing holder is logged and skipped, the rest of the batch
//! continues. The scheduler that decides *when* these run lives outside
//! this crate; callers pass the cycle's wall-clock time and calendar day
//! explicitly so runs are deterministic and testable.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use log::{debug, error, warn};

use crate::assets::AssetServiceTrait;
use crate::connections::{BalanceProviderTrait, ConnectionReconciler, ConnectionRepositoryTrait};
use crate::constants::PROVIDER_TIMEOUT_SECS;
use crate::holdings::{HoldingOrigin, HoldingRepositoryTrait};
use crate::ledger::{LedgerServiceTrait, TradeDirection};
use crate::portfolio::snapshot::PortfolioHistoryBuilderTrait;
use crate::Result;

/// Drives the periodic batch work: price refresh, connection
/// reconciliation, periodic investment execution, and daily snapshot
/// maintenance.
pub struct JobsService {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    asset_service: Arc<dyn AssetServiceTrait>,
    connection_repository: Arc<dyn ConnectionRepositoryTrait>,
    balance_provider: Arc<dyn BalanceProviderTrait>,
    reconciler: Arc<ConnectionReconciler>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
    history_builder: Arc<dyn PortfolioHistoryBuilderTrait>,
}

impl JobsService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        asset_service: Arc<dyn AssetServiceTrait>,
        connection_repository: Arc<dyn ConnectionRepositoryTrait>,
        balance_provider: Arc<dyn BalanceProviderTrait>,
        reconciler: Arc<ConnectionReconciler>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
        history_builder: Arc<dyn PortfolioHistoryBuilderTrait>,
    ) -> Self {
        Self {
            holding_repository,
            asset_service,
            connection_repository,
            balance_provider,
            reconciler,
            ledger_service,
            history_builder,
        }
    }

    /// Refreshes the live price of every asset held by anyone, gated by the
    /// staleness window. A failed asset is skipped for this cycle.
    /// Returns the number of assets refreshed.
    pub async fn refresh_prices(&self, now: DateTime<Utc>, today: NaiveDate) -> Result<usize> {
        let asset_ids: BTreeSet<String> = self
            .holding_repository
            .get_holdings()?
            .iter()
            .map(|h| h.asset_id())
            .collect();

        let mut refreshed = 0;
        for asset_id in asset_ids {
            let refresh = self.asset_service.refresh_price(&asset_id, now, today);
            match tokio::time::timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS), refresh).await {
                Ok(Ok(_)) => refreshed += 1,
                Ok(Err(e)) => {
                    warn!("Price refresh skipped for {} this cycle: {}", asset_id, e)
                }
                Err(_) => warn!(
                    "Price refresh for {} timed out after {}s, skipping this cycle",
                    asset_id, PROVIDER_TIMEOUT_SECS
                ),
            }
        }
        Ok(refreshed)
    }

    /// Reconciles every active connection against its external balances.
    /// A provider failure marks that connection invalid so the scheduler
    /// stops fetching it until re-authorized; other connections continue.
    pub async fn reconcile_connections(&self, now: DateTime<Utc>, today: NaiveDate) -> Result<()> {
        for mut connection in self.connection_repository.get_active_connections()? {
            let fetch = self.balance_provider.current_balances(&connection);
            let balances =
                match tokio::time::timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS), fetch).await
                {
                    Ok(Ok(balances)) => balances,
                    Ok(Err(e)) => {
                        error!(
                            "Balance provider failed for connection {}: {}. Marking invalid.",
                            connection.id, e
                        );
                        self.connection_repository.mark_invalid(&connection.id).await?;
                        continue;
                    }
                    Err(_) => {
                        error!(
                            "Balance provider timed out for connection {}. Marking invalid.",
                            connection.id
                        );
                        self.connection_repository.mark_invalid(&connection.id).await?;
                        continue;
                    }
                };

            let mut failed = false;
            for balance in &balances {
                if let Err(e) = self.reconciler.reconcile(&connection, balance, today, today).await
                {
                    error!(
                        "Reconciliation failed for connection {} symbol {}: {}",
                        connection.id, balance.symbol, e
                    );
                    failed = true;
                }
            }
            if !failed {
                connection.last_synced = Some(now);
                self.connection_repository.save_connection(&connection).await?;
            }
        }
        Ok(())
    }

    /// Executes due periodic investment plans by appending a buy to each
    /// due holding. Failures are per-holding and do not abort the batch.
    pub async fn run_periodic_investments(&self, today: NaiveDate) -> Result<usize> {
        let mut executed = 0;
        for holding in self.holding_repository.get_holdings()? {
            let HoldingOrigin::Periodic(cadence) = holding.origin else {
                continue;
            };
            if !cadence.is_due(holding.created_at, today) {
                continue;
            }
            let Some(quantity) = holding.periodic_quantity else {
                warn!(
                    "Periodic holding {} has no configured quantity, skipping",
                    holding.id
                );
                continue;
            };
            match self
                .ledger_service
                .append_event(&holding.id, TradeDirection::Buy, quantity, today, today)
                .await
            {
                Ok(_) => executed += 1,
                Err(e) => error!(
                    "Periodic investment failed for holding {}: {}",
                    holding.id, e
                ),
            }
        }
        Ok(executed)
    }

    /// Re-materializes today's snapshot totals for every holder after a
    /// price refresh. Holders are processed as independent tasks; one
    /// failure never aborts the others.
    pub async fn run_snapshot_maintenance(&self, today: NaiveDate) -> Result<()> {
        let mut tasks = Vec::new();
        for holder_id in self.holding_repository.list_holders()? {
            let builder = self.history_builder.clone();
            tasks.push(tokio::spawn(async move {
                let outcome = builder.refresh_totals(&holder_id, today, today).await;
                (holder_id, outcome)
            }));
        }
        for joined in join_all(tasks).await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((holder_id, Err(e))) => {
                    error!("Snapshot maintenance failed for holder {}: {}", holder_id, e)
                }
                Err(e) => error!("Snapshot maintenance task panicked: {}", e),
            }
        }
        Ok(())
    }

    /// One full scheduled cycle, in dependency order.
    pub async fn run_daily_cycle(&self, now: DateTime<Utc>, today: NaiveDate) -> Result<()> {
        let refreshed = self.refresh_prices(now, today).await?;
        debug!("Daily cycle refreshed {} asset prices", refreshed);
        self.reconcile_connections(now, today).await?;
        let executed = self.run_periodic_investments(today).await?;
        debug!("Daily cycle executed {} periodic investments", executed);
        self.run_snapshot_maintenance(today).await
    }
}
