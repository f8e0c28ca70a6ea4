//! Store Module
//!
//! Reducer-driven state containers with ordered listeners, path selectors,
//! broadcasting providers and a registry for looking stores up by name.

mod action;
mod handle;
pub(crate) mod listener;
mod path;
mod provider;
mod registry;
mod select;


// Re-export public types
pub use action::{Action, Reducer, ReducerError};
pub use handle::{Store, StoreId};
pub use listener::{ListenerId, Subscription};
pub use path::PropPath;
pub use provider::{Provider, ProviderGroup, ProviderOptions};
pub use registry::StoreRegistry;
pub use select::{Selection, Selector, Selectors};
