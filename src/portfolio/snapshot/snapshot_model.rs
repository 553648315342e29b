//! Portfolio snapshot domain models.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_SCALE;

/// Materialized per-day view of a holder's portfolio: the holdings that
/// participated on that day (weak references by id) and their total value.
///
/// Snapshots are created lazily. The first mutation touching a date creates
/// it by carrying forward the most recent earlier snapshot's holding set,
/// or an empty zero-value snapshot when none exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// `<HOLDER>_<YYYY-MM-DD>`, unique per (holder, date).
    pub id: String,
    pub holder_id: String,
    pub snapshot_date: NaiveDate,
    #[serde(default)]
    pub holding_ids: HashSet<String>,
    /// Total market value at scale 8. Reporting rounds to scale 2 via
    /// [`PortfolioSnapshot::reported_total`].
    #[serde(default)]
    pub total_value: Decimal,
    pub calculated_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    pub fn snapshot_id(holder_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", holder_id, date)
    }

    /// Empty zero-value snapshot for a holder on a date.
    pub fn empty(holder_id: &str, date: NaiveDate, now: DateTime<Utc>) -> Self {
        PortfolioSnapshot {
            id: Self::snapshot_id(holder_id, date),
            holder_id: holder_id.to_string(),
            snapshot_date: date,
            holding_ids: HashSet::new(),
            total_value: Decimal::ZERO,
            calculated_at: now,
        }
    }

    /// New snapshot for `date` carrying this snapshot's holding set forward.
    /// The total is left for the caller to recompute.
    pub fn carry_forward(&self, date: NaiveDate, now: DateTime<Utc>) -> Self {
        PortfolioSnapshot {
            id: Self::snapshot_id(&self.holder_id, date),
            holder_id: self.holder_id.clone(),
            snapshot_date: date,
            holding_ids: self.holding_ids.clone(),
            total_value: self.total_value,
            calculated_at: now,
        }
    }

    /// Total value rounded half-up to the reporting scale.
    pub fn reported_total(&self) -> Decimal {
        self.total_value
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Compares holding membership and total value, ignoring `calculated_at`.
    /// Used to assert rebuild idempotency.
    pub fn is_content_equal(&self, other: &Self) -> bool {
        self.holder_id == other.holder_id
            && self.snapshot_date == other.snapshot_date
            && self.holding_ids == other.holding_ids
            && self.total_value == other.total_value
    }
}
