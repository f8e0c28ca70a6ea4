//! Error types for the cache and store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::store::ReducerError;

// == Error Enum ==
/// Unified error type for caches, stores and the store registry.
#[derive(Error, Debug)]
pub enum Error {
    /// A cache was constructed with a capacity it cannot honor
    #[error("Invalid cache capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// The reducer rejected an action; the store state was left untouched
    #[error("Reducer failed in store '{store}' on action '{kind}' (position {index}): {source}")]
    ReducerFailure {
        store: String,
        kind: &'static str,
        index: usize,
        #[source]
        source: ReducerError,
    },

    /// Dispatch was called from inside the store's own reducer
    #[error("Reentrant dispatch on store '{0}'")]
    ReentrantDispatch(String),

    /// State could not be turned into a tree for path selectors
    #[error("Selection failed: {0}")]
    Selection(#[from] serde_json::Error),

    /// A broadcasting provider was mounted without an id
    #[error("Broadcasting providers require a unique id")]
    MissingProviderId,

    /// Two broadcasting providers of one group share an id
    #[error("Provider id already mounted: {0}")]
    DuplicateProviderId(String),

    /// A registered store does not have the requested state/action types
    #[error("Store '{0}' has different state or action types")]
    StoreTypeMismatch(String),

    /// The registry was cleared while a caller was waiting for a store
    #[error("Registry closed before store '{0}' was registered")]
    RegistryClosed(String),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_failure_message() {
        let err = Error::ReducerFailure {
            store: "blogposts".to_string(),
            kind: "post.select",
            index: 1,
            source: ReducerError::new("no such post"),
        };
        let message = err.to_string();
        assert!(message.contains("blogposts"));
        assert!(message.contains("post.select"));
        assert!(message.contains("no such post"));
    }

    #[test]
    fn test_selection_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = serde_err.into();
        assert!(matches!(err, Error::Selection(_)));
    }
}
