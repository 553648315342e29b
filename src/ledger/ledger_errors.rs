use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised by ledger mutation. These are surfaced synchronously
/// to the caller; no partial state is written.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Transaction date precedes the product epoch cutoff.
    #[error("invalid_date: {date} precedes the portfolio epoch {epoch}")]
    InvalidDate { date: NaiveDate, epoch: NaiveDate },

    /// A sell, or the deletion of a buy, would make the running balance
    /// negative at some date.
    #[error("quantity_below_zero: balance {balance} on {date} cannot cover {requested}")]
    QuantityBelowZero {
        date: NaiveDate,
        balance: Decimal,
        requested: Decimal,
    },
}
