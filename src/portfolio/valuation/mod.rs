pub mod valuation_service;


pub use valuation_service::{value_of, DailyPriceIndex, ValuationService};
