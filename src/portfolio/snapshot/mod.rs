pub mod history_builder;
pub mod snapshot_model;
pub mod snapshot_traits;


pub use history_builder::PortfolioHistoryBuilder;
pub use snapshot_model::*;
pub use snapshot_traits::*;
