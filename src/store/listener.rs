//! Listener Module
//!
//! Ordered listener registrations shared by stores and the event hub.
//!
//! Notification iterates a snapshot of the registrations taken before the
//! first callback runs. Registrations added during a notification round are
//! first called in the next round; registrations removed during a round are
//! skipped if their turn has not come yet.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of one registration in a listener list.
pub type ListenerId = u64;

// == Registration ==
/// A single registered callback.
pub(crate) struct Registration<F: ?Sized> {
    id: ListenerId,
    active: Rc<Cell<bool>>,
    callback: Rc<F>,
}

impl<F: ?Sized> Clone for Registration<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Rc::clone(&self.active),
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<F: ?Sized> Registration<F> {
    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn callback(&self) -> &F {
        &self.callback
    }
}

// == Listener List ==
/// Registrations in subscription order. The same callback may be registered
/// more than once; every registration is called.
pub(crate) struct ListenerList<F: ?Sized> {
    next_id: ListenerId,
    entries: Vec<Registration<F>>,
}

impl<F: ?Sized> Default for ListenerList<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> ListenerList<F> {
    pub(crate) fn push(&mut self, callback: Rc<F>) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Registration {
            id,
            active: Rc::new(Cell::new(true)),
            callback,
        });
        id
    }

    /// Removes exactly the registration with `id`.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                entry.active.set(false);
                true
            }
            None => false,
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Registration<F>> {
        self.entries.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            entry.active.set(false);
        }
    }
}

/// Subscribes `callback` to the shared list and returns its handle.
pub(crate) fn subscribe<F: ?Sized + 'static>(
    list: &Rc<RefCell<ListenerList<F>>>,
    callback: Rc<F>,
) -> Subscription {
    let id = list.borrow_mut().push(callback);
    let weak: Weak<RefCell<ListenerList<F>>> = Rc::downgrade(list);
    Subscription {
        id,
        remover: Some(Box::new(move || {
            weak.upgrade()
                .map(|list| list.borrow_mut().remove(id))
                .unwrap_or(false)
        })),
    }
}

// == Subscription ==
/// Handle returned by `subscribe`.
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a Subscription keeps the listener registered"]
pub struct Subscription {
    id: ListenerId,
    remover: Option<Box<dyn FnOnce() -> bool>>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Removes this registration. Returns false if it was already gone
    /// (e.g. the owning store or hub no longer exists).
    pub fn unsubscribe(mut self) -> bool {
        self.remover.take().map(|remove| remove()).unwrap_or(false)
    }

    /// Runs `after` once this registration has been removed.
    pub(crate) fn on_unsubscribe<G>(mut self, after: G) -> Self
    where
        G: FnOnce() + 'static,
    {
        let remove = self.remover.take();
        self.remover = Some(Box::new(move || {
            let removed = remove.map(|remove| remove()).unwrap_or(false);
            after();
            removed
        }));
        self
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = dyn Fn() -> u32;

    fn callback(value: u32) -> Rc<Callback> {
        Rc::new(move || value)
    }

    fn call_active(list: &ListenerList<Callback>) -> Vec<u32> {
        list.snapshot()
            .iter()
            .filter(|r| r.is_active())
            .map(|r| (r.callback())())
            .collect()
    }

    #[test]
    fn test_list_keeps_subscription_order() {
        let mut list: ListenerList<Callback> = ListenerList::default();
        list.push(callback(1));
        list.push(callback(2));
        list.push(callback(3));

        assert_eq!(call_active(&list), vec![1, 2, 3]);
    }

    #[test]
    fn test_list_remove_exact_registration() {
        let mut list: ListenerList<Callback> = ListenerList::default();
        let shared = callback(7);
        let first = list.push(Rc::clone(&shared));
        let _second = list.push(shared);

        assert!(list.remove(first));
        assert!(!list.remove(first));
        assert_eq!(list.len(), 1);
        assert_eq!(call_active(&list), vec![7]);
    }

    #[test]
    fn test_snapshot_sees_removal_through_flag() {
        let mut list: ListenerList<Callback> = ListenerList::default();
        let a = list.push(callback(1));
        list.push(callback(2));

        let snapshot = list.snapshot();
        list.remove(a);

        assert!(!snapshot[0].is_active());
        assert!(snapshot[1].is_active());
    }

    #[test]
    fn test_clear_deactivates_everything() {
        let mut list: ListenerList<Callback> = ListenerList::default();
        list.push(callback(1));
        let snapshot = list.snapshot();

        list.clear();

        assert_eq!(list.len(), 0);
        assert!(!snapshot[0].is_active());
    }

    #[test]
    fn test_subscription_unsubscribe() {
        let list: Rc<RefCell<ListenerList<Callback>>> = Rc::default();
        let sub = subscribe(&list, callback(1));
        assert_eq!(list.borrow().len(), 1);

        assert!(sub.unsubscribe());
        assert_eq!(list.borrow().len(), 0);
    }

    #[test]
    fn test_subscription_outlives_list() {
        let list: Rc<RefCell<ListenerList<Callback>>> = Rc::default();
        let sub = subscribe(&list, callback(1));
        drop(list);

        assert!(!sub.unsubscribe());
    }
}
