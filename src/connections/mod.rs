pub mod connections_model;
pub mod connections_traits;
pub mod reconciler;

#[cfg(test)]
mod reconciler_tests;

pub use connections_model::*;
pub use connections_traits::*;
pub use reconciler::ConnectionReconciler;
