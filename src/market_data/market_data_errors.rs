use thiserror::Error;

/// Errors surfaced by market data providers and price lookups.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The external quote provider failed or timed out. Batch jobs recover
    /// from this locally; it never aborts a cycle.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("No quote found for symbol: {0}")]
    NotFound(String),
}
