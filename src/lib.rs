//! Micro Store - client-side state plumbing
//!
//! Provides a bounded FIFO memo cache, a topic pub/sub hub and a synchronous
//! reducer store with selectors, providers and a store registry.

pub mod cache;
pub mod config;
pub mod error;
pub mod hub;
pub mod store;

pub use cache::{BoundedCache, CacheStats};
pub use config::Config;
pub use error::{Error, Result};
pub use hub::EventHub;
pub use store::{
    Action, PropPath, Provider, ProviderGroup, ProviderOptions, Reducer, ReducerError, Selection,
    Selectors, Store, StoreId, StoreRegistry, Subscription,
};
