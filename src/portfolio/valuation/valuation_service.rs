//! Prices one holding at one date.
//!
//! Valuation combines the pure quantity projection with the price lookup
//! policy. Day loops (forward rebuild, statistics history) pre-fetch each
//! asset's history once into a [`DailyPriceIndex`] instead of hitting the
//! repository per day.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::assets::AssetRepositoryTrait;
use crate::constants::VALUATION_SCALE;
use crate::ledger::{projector, LedgerEvent};
use crate::Result;

/// Pre-fetched daily price lookup for one asset.
pub struct DailyPriceIndex {
    pub asset_id: String,
    current_price: Decimal,
    history: BTreeMap<NaiveDate, Decimal>,
}

impl DailyPriceIndex {
    pub fn new(asset_id: &str, current_price: Decimal, history: BTreeMap<NaiveDate, Decimal>) -> Self {
        DailyPriceIndex {
            asset_id: asset_id.to_string(),
            current_price,
            history,
        }
    }

    /// Price lookup policy:
    /// - `date == today`: the asset's live current price;
    /// - otherwise the latest history row with date <= target;
    /// - no such row: fall back to the live current price.
    ///
    /// The final fallback can introduce look-ahead bias into historical
    /// computations when history is sparse. That is the documented product
    /// behavior; do not change it without product clarification.
    pub fn price_on(&self, date: NaiveDate, today: NaiveDate) -> Decimal {
        if date == today {
            return self.current_price;
        }
        match self.history.range(..=date).next_back() {
            Some((_, price)) => *price,
            None => self.current_price,
        }
    }
}

/// Market value of a ledger at `date`: projected quantity times the day's
/// price, rounded half-up at the valuation scale.
pub fn value_of(
    events: &[LedgerEvent],
    prices: &DailyPriceIndex,
    date: NaiveDate,
    today: NaiveDate,
) -> Decimal {
    let quantity = projector::quantity_at(events, date);
    (quantity * prices.price_on(date, today))
        .round_dp_with_strategy(VALUATION_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Service resolving prices and holding values against the asset repository.
pub struct ValuationService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
}

impl ValuationService {
    pub fn new(asset_repository: Arc<dyn AssetRepositoryTrait>) -> Self {
        Self { asset_repository }
    }

    /// Loads the asset's live price and full history through `today` into
    /// an index usable for any date in `[epoch, today]`.
    pub fn load_price_index(&self, asset_id: &str, today: NaiveDate) -> Result<DailyPriceIndex> {
        let asset = self.asset_repository.get_asset(asset_id)?;
        let history = self
            .asset_repository
            .get_price_history(asset_id, None, Some(today))?
            .into_iter()
            .map(|r| (r.date, r.price))
            .collect();
        Ok(DailyPriceIndex::new(asset_id, asset.current_price, history))
    }

    /// One-shot price lookup with the [`DailyPriceIndex::price_on`] policy.
    pub fn price_at(&self, asset_id: &str, date: NaiveDate, today: NaiveDate) -> Result<Decimal> {
        let asset = self.asset_repository.get_asset(asset_id)?;
        if date == today {
            return Ok(asset.current_price);
        }
        match self.asset_repository.get_price_at_or_before(asset_id, date)? {
            Some(record) => Ok(record.price),
            None => Ok(asset.current_price),
        }
    }

    /// Market value of one ledger at `date`, resolving prices through the
    /// repository.
    pub fn value_at(
        &self,
        asset_id: &str,
        events: &[LedgerEvent],
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Decimal> {
        let quantity = projector::quantity_at(events, date);
        let price = self.price_at(asset_id, date, today)?;
        Ok((quantity * price)
            .round_dp_with_strategy(VALUATION_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }
}
