//! Cache Module
//!
//! Provides a bounded in-memory memo cache with FIFO eviction.

mod bounded;
mod order;
mod stats;


// Re-export public types
pub use bounded::BoundedCache;
pub use order::InsertionOrder;
pub use stats::CacheStats;
