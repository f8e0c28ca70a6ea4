//! Store Registry Module
//!
//! Explicitly owned directory of named stores. Create one at startup, pass it
//! to whoever needs to find stores, and `clear` it on teardown.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{Action, Reducer, Store, StoreId};

type StoreHandle = Rc<dyn Any>;

struct RegisteredStore {
    id: StoreId,
    name: String,
    handle: StoreHandle,
}

// == Store Registry ==
/// Named stores of any state/action types, plus callers waiting for a name.
#[derive(Default)]
pub struct StoreRegistry {
    stores: RefCell<Vec<RegisteredStore>>,
    waiters: RefCell<HashMap<String, Vec<oneshot::Sender<StoreHandle>>>>,
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .stores
            .borrow()
            .iter()
            .map(|store| store.name.clone())
            .collect();
        f.debug_struct("StoreRegistry")
            .field("stores", &names)
            .field("waiting", &self.waiters.borrow().len())
            .finish()
    }
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds a store and wakes every caller waiting for its name.
    pub fn register<S: 'static, A: 'static>(&self, store: &Store<S, A>) {
        let handle: StoreHandle = Rc::new(store.clone());
        let name = store.name().to_string();

        self.stores.borrow_mut().push(RegisteredStore {
            id: store.id(),
            name: name.clone(),
            handle: Rc::clone(&handle),
        });
        info!("registry: store '{}' registered as {}", name, store.id());

        let waiting = self.waiters.borrow_mut().remove(&name).unwrap_or_default();
        if !waiting.is_empty() {
            debug!("registry: resolving {} waiter(s) for '{}'", waiting.len(), name);
        }
        for waiter in waiting {
            // A dropped receiver means the caller stopped waiting
            let _ = waiter.send(Rc::clone(&handle));
        }
    }

    /// Creates a named store and registers it.
    pub fn create_store<S, A, F, R>(
        &self,
        name: &str,
        initial_state: F,
        reducer: R,
    ) -> Result<Store<S, A>>
    where
        S: fmt::Debug + 'static,
        A: Action + fmt::Debug + 'static,
        F: FnOnce() -> S,
        R: Reducer<S, A> + 'static,
    {
        let store = Store::named(name, initial_state, reducer)?;
        self.register(&store);
        Ok(store)
    }

    /// Removes the store with `id`. Returns false if it was not registered.
    pub fn unregister(&self, id: StoreId) -> bool {
        let mut stores = self.stores.borrow_mut();
        let before = stores.len();
        stores.retain(|store| store.id != id);
        stores.len() != before
    }

    // == Find ==
    /// Returns the most recently registered store named `name`.
    pub fn find<S: 'static, A: 'static>(&self, name: &str) -> Result<Option<Store<S, A>>> {
        self.lookup(name)
            .map(|handle| downcast(&handle, name))
            .transpose()
    }

    // == On Store ==
    /// Resolves with the store named `name` as soon as it is registered, or
    /// immediately if it already is.
    ///
    /// The future fails with [`Error::RegistryClosed`] if the registry is
    /// cleared first and with [`Error::StoreTypeMismatch`] if the store has
    /// other types than requested.
    pub fn on_store<S: 'static, A: 'static>(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Store<S, A>>> {
        let (sender, receiver) = oneshot::channel();

        match self.lookup(name) {
            Some(handle) => {
                let _ = sender.send(handle);
            }
            None => {
                debug!("registry: waiting for store '{}'", name);
                let mut waiters = self.waiters.borrow_mut();
                // Drop senders whose futures were abandoned
                waiters.retain(|_, senders| {
                    senders.retain(|sender| !sender.is_closed());
                    !senders.is_empty()
                });
                waiters
                    .entry(name.to_string())
                    .or_default()
                    .push(sender);
            }
        }

        let name = name.to_string();
        async move {
            let handle = receiver
                .await
                .map_err(|_| Error::RegistryClosed(name.clone()))?;
            downcast(&handle, &name)
        }
    }

    /// Number of `on_store` futures still waiting for a registration.
    pub fn pending_waiters(&self) -> usize {
        self.waiters.borrow().values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.stores.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.borrow().is_empty()
    }

    // == Clear ==
    /// Drops every registered store and fails all pending waiters.
    pub fn clear(&self) {
        let removed = {
            let mut stores = self.stores.borrow_mut();
            let count = stores.len();
            stores.clear();
            count
        };
        let waiters = std::mem::take(&mut *self.waiters.borrow_mut());
        info!(
            "registry: cleared {} store(s) and {} pending name(s)",
            removed,
            waiters.len()
        );
    }

    fn lookup(&self, name: &str) -> Option<StoreHandle> {
        self.stores
            .borrow()
            .iter()
            .rev()
            .find(|store| store.name == name)
            .map(|store| Rc::clone(&store.handle))
    }
}

fn downcast<S: 'static, A: 'static>(handle: &StoreHandle, name: &str) -> Result<Store<S, A>> {
    handle
        .downcast_ref::<Store<S, A>>()
        .cloned()
        .ok_or_else(|| Error::StoreTypeMismatch(name.to_string()))
}
