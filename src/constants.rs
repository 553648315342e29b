use chrono::NaiveDate;

/// Decimal scale for quantities and prices.
pub const QUANTITY_SCALE: u32 = 8;

/// Decimal scale for internal valuation arithmetic.
pub const VALUATION_SCALE: u32 = 8;

/// Decimal scale for reported monetary amounts and percentages.
pub const DISPLAY_SCALE: u32 = 2;

/// Decimal scale for intermediate ratio divisions before the final
/// multiply-by-100 and display rounding.
pub const RATIO_SCALE: u32 = 4;

/// Number of trailing zero-value snapshots seeded when a holder's portfolio
/// is first initialized.
pub const SNAPSHOT_SEED_DAYS: i64 = 7;

/// Minimum age of an asset's live price before a refresh hits the external
/// provider again. Staleness gate only, no eviction.
pub const PRICE_STALENESS_SECS: i64 = 900;

/// Upper bound on a single external provider call.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Earliest transaction date the product accepts. Also the start of the
/// all-time statistics window.
pub fn portfolio_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
}
