//! Pure quantity projection over a holding's ledger.
//!
//! No I/O and no clock access; callers pass the target date explicitly so
//! projections are deterministic and restartable.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ledger_model::LedgerEvent;

/// Held quantity as of `date`, inclusive of same-day events. Buys add,
/// sells subtract. Non-negativity is enforced at write time, not here.
pub fn quantity_at(events: &[LedgerEvent], date: NaiveDate) -> Decimal {
    events
        .iter()
        .filter(|e| e.effective_date <= date)
        .map(|e| e.signed_quantity())
        .sum()
}

/// Net signed quantity of the events effective exactly on `date`.
pub fn net_signed_quantity(events: &[LedgerEvent], date: NaiveDate) -> Decimal {
    events
        .iter()
        .filter(|e| e.effective_date == date)
        .map(|e| e.signed_quantity())
        .sum()
}

/// First date on which the running balance of `events` goes negative, if
/// any. The balance only changes on event dates, so checking each distinct
/// event date is sufficient.
pub fn first_negative_date(events: &[LedgerEvent]) -> Option<NaiveDate> {
    let mut dates: Vec<NaiveDate> = events.iter().map(|e| e.effective_date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
        .into_iter()
        .find(|d| quantity_at(events, *d) < Decimal::ZERO)
}
