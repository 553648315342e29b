//! Repository and builder traits for portfolio snapshots.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::PortfolioSnapshot;
use crate::errors::Result;
use crate::holdings::Holding;

/// Repository trait for managing portfolio snapshots.
#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// The snapshot for (holder, date), if one was materialized.
    fn get_snapshot(&self, holder_id: &str, date: NaiveDate) -> Result<Option<PortfolioSnapshot>>;

    /// Snapshots for a holder within an optional date range, ordered by date.
    fn get_snapshots_by_holder(
        &self,
        holder_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioSnapshot>>;

    /// Latest snapshot strictly before the given date.
    fn get_latest_snapshot_before(
        &self,
        holder_id: &str,
        date: NaiveDate,
    ) -> Result<Option<PortfolioSnapshot>>;

    /// Every snapshot whose holding set references the holding.
    fn get_snapshots_referencing(&self, holding_id: &str) -> Result<Vec<PortfolioSnapshot>>;

    /// Save or replace snapshots, keyed by (holder, date).
    async fn save_snapshots(&self, snapshots: &[PortfolioSnapshot]) -> Result<()>;

    /// Delete all of the holder's snapshots in `[start, end]` and save the
    /// new ones atomically. This is the transaction boundary that keeps a
    /// rebuild all-or-nothing.
    async fn overwrite_snapshots_for_holder_in_range(
        &self,
        holder_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        snapshots_to_save: &[PortfolioSnapshot],
    ) -> Result<()>;
}

/// Trait for the forward snapshot rebuild pipeline.
#[async_trait]
pub trait PortfolioHistoryBuilderTrait: Send + Sync {
    /// Rebuilds the holder's snapshots from `from` through `today`
    /// inclusive, making `holding` visible (replace-by-identity) on every
    /// day in the range. Idempotent for unchanged inputs.
    async fn rebuild_forward(
        &self,
        holding: &Holding,
        from: NaiveDate,
        today: NaiveDate,
    ) -> Result<()>;

    /// Recomputes totals for the holder's existing snapshots in
    /// `[from, today]` without changing membership. Used by the scheduled
    /// price-refresh maintenance pass.
    async fn refresh_totals(&self, holder_id: &str, from: NaiveDate, today: NaiveDate)
        -> Result<()>;

    /// Removes the holding from every snapshot referencing it, recomputes
    /// those totals, and cascade-deletes its ledger events and the holding
    /// itself. Carry-forward can never resurrect it afterwards.
    async fn delete_holding(&self, holding: &Holding, today: NaiveDate) -> Result<()>;

    /// Seeds the trailing zero-value snapshots on first portfolio use.
    async fn seed_bootstrap(&self, holder_id: &str, today: NaiveDate) -> Result<()>;
}
