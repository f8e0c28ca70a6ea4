//! Store Handle Module
//!
//! Synchronous single-writer state container. Actions are folded into the
//! state by one reducer, then every subscribed listener is notified in
//! subscription order.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::store::listener::{self, ListenerList};
use crate::store::{Action, Reducer, Selection, Selectors, Subscription};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique store identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        Self(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store-{}", self.0)
    }
}

type Listener = dyn Fn();

struct StoreInner<S, A> {
    id: StoreId,
    name: String,
    state: RefCell<Rc<S>>,
    reducer: Box<dyn Reducer<S, A>>,
    listeners: Rc<RefCell<ListenerList<Listener>>>,
    /// Set while the reducer runs
    reducing: Cell<bool>,
}

/// Clears the reducing flag when a dispatch finishes or unwinds.
struct ReducingGuard<'a>(&'a Cell<bool>);

impl Drop for ReducingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// == Store ==
/// Handle to a reducer store. Cloning yields another handle to the same store.
///
/// Stores are single-threaded: dispatch runs to completion, including all
/// listener notifications, before returning. Published states are never
/// mutated; each transition replaces the state with a new value.
///
/// Listeners may dispatch again from inside a notification. Reducers may not:
/// a dispatch issued while the reducer runs fails with
/// [`Error::ReentrantDispatch`].
pub struct Store<S, A> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<S, A> Store<S, A>
where
    S: fmt::Debug + 'static,
    A: Action + fmt::Debug + 'static,
{
    // == Constructors ==
    /// Creates an unnamed store. See [`Store::named`].
    pub fn create<F, R>(initial_state: F, reducer: R) -> Result<Self>
    where
        F: FnOnce() -> S,
        R: Reducer<S, A> + 'static,
    {
        Self::named("store", initial_state, reducer)
    }

    /// Creates a store and primes it by dispatching `A::default()` once, so the
    /// reducer can establish derived defaults.
    ///
    /// # Arguments
    /// * `name` - Name used in logs and by the store registry
    /// * `initial_state` - Factory for the state before priming
    /// * `reducer` - The store's reducer
    pub fn named<F, R>(name: impl Into<String>, initial_state: F, reducer: R) -> Result<Self>
    where
        F: FnOnce() -> S,
        R: Reducer<S, A> + 'static,
    {
        let store = Self {
            inner: Rc::new(StoreInner {
                id: StoreId::next(),
                name: name.into(),
                state: RefCell::new(Rc::new(initial_state())),
                reducer: Box::new(reducer),
                listeners: Rc::default(),
                reducing: Cell::new(false),
            }),
        };

        store.dispatch(A::default())?;
        debug!("store '{}' created as {}", store.inner.name, store.inner.id);
        Ok(store)
    }

    // == Dispatch ==
    /// Applies one action and notifies all listeners.
    pub fn dispatch(&self, action: A) -> Result<()> {
        self.dispatch_all(std::iter::once(action))
    }

    /// Applies actions left to right as one logical dispatch, then notifies
    /// every listener exactly once.
    ///
    /// An empty sequence is a no-op and notifies nobody. If the reducer fails
    /// on any action, nothing is committed and no listener is notified.
    pub fn dispatch_all<I>(&self, actions: I) -> Result<()>
    where
        I: IntoIterator<Item = A>,
    {
        let actions: Vec<A> = actions.into_iter().collect();
        let Some((first, rest)) = actions.split_first() else {
            return Ok(());
        };

        if self.inner.reducing.replace(true) {
            return Err(Error::ReentrantDispatch(self.inner.name.clone()));
        }
        let guard = ReducingGuard(&self.inner.reducing);

        debug!(
            "store '{}' action{}: {}",
            self.inner.name,
            if actions.len() > 1 { "s" } else { "" },
            actions.iter().map(Action::kind).collect::<Vec<_>>().join(", ")
        );

        let before = self.get_state();
        trace!("store '{}' before: {:?}", self.inner.name, before);

        let mut next = self.reduce(&before, first, 0)?;
        for (offset, action) in rest.iter().enumerate() {
            next = self.reduce(&next, action, offset + 1)?;
        }
        drop(guard);

        trace!("store '{}' after: {:?}", self.inner.name, next);
        *self.inner.state.borrow_mut() = Rc::new(next);

        self.notify();
        Ok(())
    }

    fn reduce(&self, state: &S, action: &A, index: usize) -> Result<S> {
        self.inner
            .reducer
            .reduce(state, action)
            .map_err(|source| Error::ReducerFailure {
                store: self.inner.name.clone(),
                kind: action.kind(),
                index,
                source,
            })
    }

    fn notify(&self) {
        let snapshot = self.inner.listeners.borrow().snapshot();
        for registration in snapshot {
            if registration.is_active() {
                (registration.callback())();
            }
        }
    }

    // == Change ==
    /// Returns a callback that maps a value to an action and dispatches it.
    ///
    /// Useful for wiring input handlers: `let on_title = store.change(Action::Title);`
    pub fn change<T, F>(&self, to_action: F) -> impl Fn(T) -> Result<()>
    where
        F: Fn(T) -> A,
    {
        let store = self.clone();
        move |value| store.dispatch(to_action(value))
    }
}

impl<S, A> Store<S, A> {
    pub fn id(&self) -> StoreId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // == Get State ==
    /// Returns the current state snapshot.
    pub fn get_state(&self) -> Rc<S> {
        Rc::clone(&self.inner.state.borrow())
    }

    // == Subscribe ==
    /// Registers a listener called after every dispatch.
    ///
    /// Subscribing the same callback twice registers it twice; each returned
    /// [`Subscription`] removes only its own registration.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        listener::subscribe(&self.inner.listeners, Rc::new(listener) as Rc<Listener>)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    // == Select State ==
    /// Applies `selectors` to the current state.
    pub fn select_state(&self, selectors: &Selectors<S>) -> Result<Selection>
    where
        S: Serialize,
    {
        selectors.select(&self.get_state())
    }
}
