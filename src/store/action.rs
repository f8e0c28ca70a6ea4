//! Action and Reducer Module
//!
//! Typed actions and the pure reducer functions that fold them into state.

use thiserror::Error;

// == Action ==
/// A requested state transition.
///
/// Actions are usually enums with one variant per kind, each carrying exactly
/// the payload that kind needs. The `Default` value is the no-op action a store
/// dispatches once at creation to prime its state.
pub trait Action: Default {
    /// Discriminator used in logs and errors.
    fn kind(&self) -> &'static str;
}

// == Reducer Error ==
/// Error a reducer returns when it cannot apply an action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ReducerError {
    message: String,
}

impl ReducerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// == Reducer ==
/// A pure function from `(state, action)` to the next state.
///
/// Reducers must not mutate the state they are given and must return the
/// state unchanged for action kinds they do not handle. They must not dispatch
/// to the store they belong to.
pub trait Reducer<S, A> {
    fn reduce(&self, state: &S, action: &A) -> Result<S, ReducerError>;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &A) -> Result<S, ReducerError>,
{
    fn reduce(&self, state: &S, action: &A) -> Result<S, ReducerError> {
        self(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    enum Toggle {
        #[default]
        Init,
        Flip,
    }

    impl Action for Toggle {
        fn kind(&self) -> &'static str {
            match self {
                Toggle::Init => "init",
                Toggle::Flip => "flip",
            }
        }
    }

    struct Flipper;

    impl Reducer<bool, Toggle> for Flipper {
        fn reduce(&self, state: &bool, action: &Toggle) -> Result<bool, ReducerError> {
            Ok(match action {
                Toggle::Flip => !state,
                Toggle::Init => *state,
            })
        }
    }

    #[test]
    fn test_default_action_is_priming_action() {
        assert_eq!(Toggle::default().kind(), "init");
    }

    #[test]
    fn test_struct_reducer() {
        assert_eq!(Flipper.reduce(&false, &Toggle::Flip), Ok(true));
        assert_eq!(Flipper.reduce(&false, &Toggle::Init), Ok(false));
    }

    #[test]
    fn test_closure_reducer() {
        let reducer = |state: &u32, action: &Toggle| match action {
            Toggle::Flip => Err(ReducerError::new("cannot flip a number")),
            Toggle::Init => Ok(*state),
        };

        assert_eq!(reducer.reduce(&3, &Toggle::Init), Ok(3));
        let err = reducer.reduce(&3, &Toggle::Flip).unwrap_err();
        assert_eq!(err.message(), "cannot flip a number");
        assert_eq!(err.to_string(), "cannot flip a number");
    }
}
