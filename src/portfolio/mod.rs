pub mod snapshot;
pub mod statistics;
pub mod valuation;

pub use snapshot::*;
pub use statistics::*;
pub use valuation::*;
