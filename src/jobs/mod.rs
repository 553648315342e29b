pub mod jobs_service;

#[cfg(test)]
mod jobs_service_tests;

pub use jobs_service::JobsService;
