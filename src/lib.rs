//! Ledgerfolio core - investment ledger, snapshots, and statistics.
//!
//! This crate contains the reconstruction-and-aggregation engine for a
//! portfolio tracker: an append-only ledger of trade events per holding,
//! point-in-time quantity projection, lazily materialized daily portfolio
//! snapshots, and the statistics derived from them. It is storage-agnostic
//! and defines repository traits that a storage backend implements; an
//! in-memory backend is provided in [`storage`].

pub mod assets;
pub mod connections;
pub mod constants;
pub mod errors;
pub mod holdings;
pub mod jobs;
pub mod ledger;
pub mod market_data;
pub mod portfolio;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::*;
pub use holdings::*;
pub use portfolio::*;

pub use errors::Error;
pub use errors::Result;
