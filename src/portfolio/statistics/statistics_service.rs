//! Derives trend, performance, and distribution metrics from current state
//! and historical prices.
//!
//! Rounding discipline: products are computed at the valuation scale,
//! ratios are rounded to scale 4 before the final multiply-by-100, and
//! every reported amount or percentage is rounded half-up to scale 2.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::assets::AssetRepositoryTrait;
use crate::constants::{DISPLAY_SCALE, RATIO_SCALE, VALUATION_SCALE};
use crate::holdings::{Holding, HoldingRepositoryTrait};
use crate::ledger::{projector, LedgerEvent, LedgerRepositoryTrait, TradeDirection};
use crate::portfolio::statistics::{
    DistributionGroup, DistributionSlice, HistoryPoint, HistoryWindow,
};
use crate::portfolio::valuation::{value_of, DailyPriceIndex, ValuationService};
use crate::Result;

/// Service computing portfolio statistics.
pub struct StatisticsService {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    valuation_service: Arc<ValuationService>,
}

/// Ratio as a scale-2 percentage in `x100` form; zero denominator yields
/// zero rather than an error.
fn percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    let ratio = (numerator / denominator)
        .round_dp_with_strategy(RATIO_SCALE, RoundingStrategy::MidpointAwayFromZero);
    (ratio * dec!(100)).round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Buy cost and sell proceeds of all events with effective date <= `through`,
/// each priced at its own transaction date. Scale 8.
fn cost_and_proceeds(
    events: &[LedgerEvent],
    prices: &DailyPriceIndex,
    through: NaiveDate,
    today: NaiveDate,
) -> (Decimal, Decimal) {
    let mut buy_cost = Decimal::ZERO;
    let mut sell_proceeds = Decimal::ZERO;
    for event in events.iter().filter(|e| e.effective_date <= through) {
        let amount = (event.quantity * prices.price_on(event.effective_date, today))
            .round_dp_with_strategy(VALUATION_SCALE, RoundingStrategy::MidpointAwayFromZero);
        match event.direction {
            TradeDirection::Buy => buy_cost += amount,
            TradeDirection::Sell => sell_proceeds += amount,
        }
    }
    (buy_cost, sell_proceeds)
}

impl StatisticsService {
    pub fn new(
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        valuation_service: Arc<ValuationService>,
    ) -> Self {
        Self {
            holding_repository,
            ledger_repository,
            asset_repository,
            valuation_service,
        }
    }

    /// Loads ledgers and price indexes for a set of holdings, one index per
    /// distinct asset.
    fn load_context(
        &self,
        holdings: &[Holding],
        today: NaiveDate,
    ) -> Result<(HashMap<String, Vec<LedgerEvent>>, HashMap<String, DailyPriceIndex>)> {
        let mut events = HashMap::new();
        let mut prices = HashMap::new();
        for holding in holdings {
            events.insert(
                holding.id.clone(),
                self.ledger_repository.get_events_by_holding(&holding.id)?,
            );
            let asset_id = holding.asset_id();
            if !prices.contains_key(&asset_id) {
                prices.insert(
                    asset_id.clone(),
                    self.valuation_service.load_price_index(&asset_id, today)?,
                );
            }
        }
        Ok((events, prices))
    }

    /// Day-over-day price move of one asset as a scale-2 percentage.
    /// Returns zero when yesterday's price is unknown or zero.
    pub fn day_trend(&self, asset_id: &str, today: NaiveDate) -> Result<Decimal> {
        let asset = self.asset_repository.get_asset(asset_id)?;
        let yesterday = match today.checked_sub_days(Days::new(1)) {
            Some(d) => d,
            None => return Ok(Decimal::ZERO),
        };
        let price_yesterday = self
            .asset_repository
            .get_price_at_or_before(asset_id, yesterday)?
            .map(|r| r.price)
            .unwrap_or(Decimal::ZERO);
        if price_yesterday.is_zero() {
            return Ok(Decimal::ZERO);
        }
        Ok(percent(
            asset.current_price - price_yesterday,
            price_yesterday,
        ))
    }

    /// Net realized+unrealized profit/loss of one holding, scale 2:
    /// current value plus sell proceeds minus buy cost, transactions priced
    /// at their own dates.
    pub fn total_change(&self, holding_id: &str, today: NaiveDate) -> Result<Decimal> {
        let holding = self.holding_repository.get_holding(holding_id)?;
        let events = self.ledger_repository.get_events_by_holding(holding_id)?;
        let prices = self
            .valuation_service
            .load_price_index(&holding.asset_id(), today)?;

        let current_value = value_of(&events, &prices, today, today);
        let (buy_cost, sell_proceeds) = cost_and_proceeds(&events, &prices, today, today);
        Ok(round_display(current_value + sell_proceeds - buy_cost))
    }

    /// Overall performance of the holder's portfolio as a scale-2
    /// percentage; zero when nothing was ever bought.
    pub fn total_performance(&self, holder_id: &str, today: NaiveDate) -> Result<Decimal> {
        let holdings = self.holding_repository.get_holdings_by_holder(holder_id)?;
        let (events, prices) = self.load_context(&holdings, today)?;

        let mut current_value = Decimal::ZERO;
        let mut total_buy_cost = Decimal::ZERO;
        let mut total_sell_proceeds = Decimal::ZERO;
        for holding in &holdings {
            let ledger = &events[&holding.id];
            let index = &prices[&holding.asset_id()];
            current_value += value_of(ledger, index, today, today);
            let (buy_cost, sell_proceeds) = cost_and_proceeds(ledger, index, today, today);
            total_buy_cost += buy_cost;
            total_sell_proceeds += sell_proceeds;
        }
        Ok(percent(
            current_value + total_sell_proceeds - total_buy_cost,
            total_buy_cost,
        ))
    }

    /// Day-over-day move of the holder's total portfolio value as a scale-2
    /// percentage; zero when yesterday's value is zero.
    pub fn portfolio_trend(&self, holder_id: &str, today: NaiveDate) -> Result<Decimal> {
        let holdings = self.holding_repository.get_holdings_by_holder(holder_id)?;
        let (events, prices) = self.load_context(&holdings, today)?;
        let yesterday = match today.checked_sub_days(Days::new(1)) {
            Some(d) => d,
            None => return Ok(Decimal::ZERO),
        };

        let mut value_today = Decimal::ZERO;
        let mut value_yesterday = Decimal::ZERO;
        for holding in &holdings {
            let ledger = &events[&holding.id];
            let index = &prices[&holding.asset_id()];
            value_today += value_of(ledger, index, today, today);
            value_yesterday += value_of(ledger, index, yesterday, today);
        }
        Ok(percent(value_today - value_yesterday, value_yesterday))
    }

    /// Current portfolio value broken down by asset class or symbol.
    /// Empty when the total value is zero.
    pub fn distribution(
        &self,
        holder_id: &str,
        group_by: DistributionGroup,
        today: NaiveDate,
    ) -> Result<Vec<DistributionSlice>> {
        let holdings = self.holding_repository.get_holdings_by_holder(holder_id)?;
        let (events, prices) = self.load_context(&holdings, today)?;

        let mut group_values: HashMap<String, Decimal> = HashMap::new();
        let mut total_value = Decimal::ZERO;
        for holding in &holdings {
            let value = value_of(&events[&holding.id], &prices[&holding.asset_id()], today, today);
            let label = match group_by {
                DistributionGroup::AssetClass => holding.asset_class.to_string(),
                DistributionGroup::Symbol => holding.symbol.clone(),
            };
            *group_values.entry(label).or_insert(Decimal::ZERO) += value;
            total_value += value;
        }
        if total_value.is_zero() {
            return Ok(Vec::new());
        }

        let mut slices: Vec<DistributionSlice> = group_values
            .into_iter()
            .map(|(label, value)| DistributionSlice {
                label,
                value: round_display(value),
                percentage: percent(value, total_value),
            })
            .collect();
        slices.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        Ok(slices)
    }

    /// Daily aggregate profit/loss over the window: for every calendar day
    /// in `[window start, today]`, the sum over holdings of value-at-day
    /// plus sell proceeds minus buy cost of the transactions up to that
    /// day. Price lookups go through per-asset indexes loaded once, since
    /// this walk is O(days x holdings x events).
    pub fn history(
        &self,
        holder_id: &str,
        window: HistoryWindow,
        today: NaiveDate,
    ) -> Result<Vec<HistoryPoint>> {
        let holdings = self.holding_repository.get_holdings_by_holder(holder_id)?;
        let (events, prices) = self.load_context(&holdings, today)?;
        let from = window.start_from(today);

        let mut points = Vec::new();
        for day in from.iter_days().take_while(|d| *d <= today) {
            let mut profit_loss = Decimal::ZERO;
            for holding in &holdings {
                let ledger = &events[&holding.id];
                let index = &prices[&holding.asset_id()];
                let value = value_of(ledger, index, day, today);
                let (buy_cost, sell_proceeds) = cost_and_proceeds(ledger, index, day, today);
                profit_loss += value + sell_proceeds - buy_cost;
            }
            points.push(HistoryPoint {
                date: day,
                value: round_display(profit_loss),
            });
        }
        Ok(points)
    }

    /// Projected quantity helper exposed for reporting layers.
    pub fn quantity_as_of(&self, holding_id: &str, date: NaiveDate) -> Result<Decimal> {
        let events = self.ledger_repository.get_events_by_holding(holding_id)?;
        Ok(projector::quantity_at(&events, date))
    }
}
