pub mod statistics_model;
pub mod statistics_service;


pub use statistics_model::*;
pub use statistics_service::StatisticsService;
