//! Provider Module
//!
//! Render-driving front ends for a store. Dispatching through a provider
//! re-renders that provider; broadcasting providers also re-render every other
//! broadcasting provider mounted in the same group, so independent view roots
//! stay in sync without subscribing themselves.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{Action, Store};

type Rerender = dyn Fn();

// == Provider Options ==
/// Mount options for a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    /// Re-render the group's other broadcasting providers on dispatch
    pub broadcast: bool,
    /// Unique id within the group; required when broadcasting
    pub id: Option<String>,
}

impl ProviderOptions {
    /// A provider that only re-renders itself.
    pub fn local() -> Self {
        Self::default()
    }

    /// A broadcasting provider identified by `id`.
    pub fn broadcast(id: impl Into<String>) -> Self {
        Self {
            broadcast: true,
            id: Some(id.into()),
        }
    }
}

struct Member {
    id: String,
    rerender: Rc<Rerender>,
}

type Members = Rc<RefCell<Vec<Member>>>;

// == Provider Group ==
/// All providers of one store.
pub struct ProviderGroup<S, A> {
    store: Store<S, A>,
    members: Members,
}

impl<S, A> ProviderGroup<S, A> {
    pub fn new(store: Store<S, A>) -> Self {
        Self {
            store,
            members: Rc::default(),
        }
    }

    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }

    /// Number of mounted broadcasting providers.
    pub fn broadcast_count(&self) -> usize {
        self.members.borrow().len()
    }

    // == Mount ==
    /// Mounts a provider whose view is refreshed by calling `rerender`.
    ///
    /// Broadcasting providers need an id that no other mounted broadcasting
    /// provider of this group uses.
    pub fn mount<F>(&self, options: ProviderOptions, rerender: F) -> Result<Provider<S, A>>
    where
        F: Fn() + 'static,
    {
        let rerender: Rc<Rerender> = Rc::new(rerender);

        if options.broadcast {
            let id = options.id.clone().ok_or(Error::MissingProviderId)?;
            let mut members = self.members.borrow_mut();
            if members.iter().any(|member| member.id == id) {
                return Err(Error::DuplicateProviderId(id));
            }
            members.push(Member {
                id,
                rerender: Rc::clone(&rerender),
            });
        }

        Ok(Provider {
            store: self.store.clone(),
            options,
            rerender,
            members: Rc::clone(&self.members),
        })
    }
}

// == Provider ==
/// A mounted provider. Dropping it unmounts it.
#[must_use = "dropping a Provider unmounts it"]
pub struct Provider<S, A> {
    store: Store<S, A>,
    options: ProviderOptions,
    rerender: Rc<Rerender>,
    members: Members,
}

impl<S, A> fmt::Debug for Provider<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("store", &self.store.name())
            .field("options", &self.options)
            .finish()
    }
}

impl<S, A> Provider<S, A> {
    pub fn id(&self) -> Option<&str> {
        self.options.id.as_deref()
    }

    pub fn is_broadcast(&self) -> bool {
        self.options.broadcast
    }

    pub fn state(&self) -> Rc<S> {
        self.store.get_state()
    }

    // == Unmount ==
    /// Removes this provider from its group's broadcast list and frees its id.
    pub fn unmount(self) {
        drop(self);
    }

    fn rerender_others(&self) {
        let own_id = self.options.id.as_deref();
        let others: Vec<Rc<Rerender>> = self
            .members
            .borrow()
            .iter()
            .filter(|member| Some(member.id.as_str()) != own_id)
            .map(|member| Rc::clone(&member.rerender))
            .collect();

        debug!(
            "provider {:?} of store '{}' re-rendering {} other provider(s)",
            own_id,
            self.store.name(),
            others.len()
        );
        for rerender in others {
            rerender();
        }
    }
}

impl<S, A> Drop for Provider<S, A> {
    fn drop(&mut self) {
        if !self.options.broadcast {
            return;
        }
        if let Some(id) = self.options.id.as_deref() {
            debug!("provider '{}' of store '{}' unmounted", id, self.store.name());
            self.members.borrow_mut().retain(|member| member.id != id);
        }
    }
}

impl<S, A> Provider<S, A>
where
    S: fmt::Debug + 'static,
    A: Action + fmt::Debug + 'static,
{
    // == Dispatch ==
    /// Dispatches to the store, then re-renders this provider and, when
    /// broadcasting, the group's other broadcasting providers.
    pub fn dispatch(&self, action: A) -> Result<()> {
        self.dispatch_all(std::iter::once(action))
    }

    /// Sequence form of [`Provider::dispatch`]. An empty sequence re-renders
    /// nothing.
    pub fn dispatch_all<I>(&self, actions: I) -> Result<()>
    where
        I: IntoIterator<Item = A>,
    {
        let actions: Vec<A> = actions.into_iter().collect();
        if actions.is_empty() {
            return Ok(());
        }

        self.store.dispatch_all(actions)?;
        (self.rerender)();
        if self.options.broadcast {
            self.rerender_others();
        }
        Ok(())
    }

    /// Returns a callback that maps a value to an action and dispatches it
    /// through this provider.
    pub fn change<T, F>(&self, to_action: F) -> impl Fn(T) -> Result<()> + '_
    where
        F: Fn(T) -> A + 'static,
    {
        move |value| self.dispatch(to_action(value))
    }
}
