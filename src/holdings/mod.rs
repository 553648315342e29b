pub mod holdings_model;
pub mod holdings_service;
pub mod holdings_traits;


pub use holdings_model::*;
pub use holdings_service::HoldingsService;
pub use holdings_traits::*;
