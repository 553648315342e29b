//! Storage backends.
//!
//! The engine only depends on the repository traits; this module ships an
//! in-memory backend used by tests and embeddable as a reference
//! implementation. A database-backed backend implements the same traits in
//! a sibling crate.

pub mod memory;

pub use memory::*;
