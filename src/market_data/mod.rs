pub mod market_data_errors;
pub mod market_data_model;
pub mod market_data_traits;

pub use market_data_errors::MarketDataError;
pub use market_data_model::*;
pub use market_data_traits::*;
