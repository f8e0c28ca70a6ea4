//! Event Hub Module
//!
//! Topic-based publish/subscribe for loosely coupled components. Listeners of
//! a topic are called synchronously, in subscription order, with the published
//! data.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{json, Value};
use tracing::debug;

use crate::store::listener::{self, ListenerList};
use crate::store::Subscription;

/// Common topics.
pub mod topics {
    pub const MODAL: &str = "modal";
    pub const MODAL_READY: &str = "modal.ready";
    pub const UNMODAL: &str = "unmodal";
    pub const ACTIVITY: &str = "activity";
}

type TopicListener = dyn Fn(&Value);
type Topic = Rc<RefCell<ListenerList<TopicListener>>>;
type TopicMap = RefCell<HashMap<String, Topic>>;

// == Event Hub ==
/// A set of named topics with their listeners.
#[derive(Default)]
pub struct EventHub {
    topics: Rc<TopicMap>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("topics", &self.topics.borrow().len())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    // == Subscribe ==
    /// Registers `listener` for every publication on `topic`.
    ///
    /// The topic is dropped once its last listener unsubscribes.
    pub fn subscribe<F>(&self, topic: &str, listener: F) -> Subscription
    where
        F: Fn(&Value) + 'static,
    {
        let list = Rc::clone(self.topics.borrow_mut().entry(topic.to_string()).or_default());
        let topics: Weak<TopicMap> = Rc::downgrade(&self.topics);
        let name = topic.to_string();

        listener::subscribe(&list, Rc::new(listener) as Rc<TopicListener>).on_unsubscribe(
            move || {
                if let Some(topics) = topics.upgrade() {
                    let mut topics = topics.borrow_mut();
                    if topics.get(&name).is_some_and(|list| list.borrow().len() == 0) {
                        debug!("hub: topic '{}' has no listeners left", name);
                        topics.remove(&name);
                    }
                }
            },
        )
    }

    // == Publish ==
    /// Publishes `data` (an empty object when None) to every listener of
    /// `topic` and returns how many were called.
    ///
    /// Publishing to a topic nobody subscribed to does nothing.
    pub fn publish(&self, topic: &str, data: Option<Value>) -> usize {
        let Some(list) = self.topics.borrow().get(topic).cloned() else {
            return 0;
        };

        let has_data = data.is_some();
        let data = data.unwrap_or_else(|| json!({}));
        let snapshot = list.borrow().snapshot();

        let mut called = 0;
        for registration in snapshot {
            if registration.is_active() {
                (registration.callback())(&data);
                called += 1;
            }
        }

        if has_data {
            debug!("hub: published '{}' to {} subscriber(s) with data: {}", topic, called, data);
        } else {
            debug!("hub: published '{}' to {} subscriber(s)", topic, called);
        }
        called
    }

    /// Number of listeners currently subscribed to `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.topics
            .borrow()
            .get(topic)
            .map(|list| list.borrow().len())
            .unwrap_or(0)
    }

    /// Number of topics with at least one listener.
    pub fn topic_count(&self) -> usize {
        self.topics.borrow().len()
    }

    /// Removes every listener of every topic.
    pub fn clear(&self) {
        for list in self.topics.borrow_mut().drain().map(|(_, list)| list) {
            list.borrow_mut().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder() -> (Rc<RefCell<Vec<Value>>>, impl Fn(&Value) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |data: &Value| sink.borrow_mut().push(data.clone()))
    }

    #[test]
    fn test_publish_to_subscribers() {
        let hub = EventHub::new();
        let (seen, listener) = recorder();
        let _sub = hub.subscribe(topics::MODAL, listener);

        let called = hub.publish(topics::MODAL, Some(json!({ "title": "Hello" })));

        assert_eq!(called, 1);
        assert_eq!(*seen.borrow(), vec![json!({ "title": "Hello" })]);
    }

    #[test]
    fn test_publish_without_data_sends_empty_object() {
        let hub = EventHub::new();
        let (seen, listener) = recorder();
        let _sub = hub.subscribe(topics::UNMODAL, listener);

        hub.publish(topics::UNMODAL, None);

        assert_eq!(*seen.borrow(), vec![json!({})]);
    }

    #[test]
    fn test_publish_unknown_topic() {
        let hub = EventHub::new();
        assert_eq!(hub.publish("nobody.listens", Some(json!(1))), 0);
    }

    #[test]
    fn test_topics_are_isolated() {
        let hub = EventHub::new();
        let (modal, modal_listener) = recorder();
        let (ready, ready_listener) = recorder();
        let _a = hub.subscribe(topics::MODAL, modal_listener);
        let _b = hub.subscribe(topics::MODAL_READY, ready_listener);

        hub.publish(topics::MODAL_READY, None);

        assert!(modal.borrow().is_empty());
        assert_eq!(ready.borrow().len(), 1);
    }

    #[test]
    fn test_listeners_called_in_order() {
        let hub = EventHub::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let order = Rc::clone(&order);
                hub.subscribe(topics::ACTIVITY, move |_| order.borrow_mut().push(i))
            })
            .collect();

        hub.publish(topics::ACTIVITY, None);

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(subs.len(), 3);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_listener() {
        let hub = EventHub::new();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let listener = move |_: &Value| seen.set(seen.get() + 1);

        let first = hub.subscribe(topics::ACTIVITY, listener.clone());
        let _second = hub.subscribe(topics::ACTIVITY, listener);
        assert!(first.unsubscribe());

        assert_eq!(hub.publish(topics::ACTIVITY, None), 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(hub.listener_count(topics::ACTIVITY), 1);
    }

    #[test]
    fn test_last_unsubscribe_drops_topic() {
        let hub = EventHub::new();
        let first = hub.subscribe(topics::MODAL, |_| {});
        let second = hub.subscribe(topics::MODAL, |_| {});
        let _other = hub.subscribe(topics::ACTIVITY, |_| {});
        assert_eq!(hub.topic_count(), 2);

        assert!(first.unsubscribe());
        assert_eq!(hub.topic_count(), 2);

        assert!(second.unsubscribe());
        assert_eq!(hub.topic_count(), 1);
        assert_eq!(hub.publish(topics::MODAL, None), 0);
    }

    #[test]
    fn test_unsubscribe_during_publish_drops_topic() {
        let hub = Rc::new(EventHub::new());
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();
        let inner = Rc::clone(&slot);
        let sub = hub.subscribe(topics::UNMODAL, move |_| {
            if let Some(sub) = inner.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(sub);

        assert_eq!(hub.publish(topics::UNMODAL, None), 1);

        assert_eq!(hub.topic_count(), 0);
        assert_eq!(hub.publish(topics::UNMODAL, None), 0);
    }

    #[test]
    fn test_listener_may_publish_and_subscribe() {
        let hub = Rc::new(EventHub::new());
        let (ready, ready_listener) = recorder();
        let _ready_sub = hub.subscribe(topics::MODAL_READY, ready_listener);

        let inner = Rc::clone(&hub);
        let _sub = hub.subscribe(topics::MODAL, move |data| {
            inner.publish(topics::MODAL_READY, Some(data.clone()));
            let _ = inner.subscribe(topics::UNMODAL, |_| {});
        });

        hub.publish(topics::MODAL, Some(json!("open")));

        assert_eq!(*ready.borrow(), vec![json!("open")]);
        assert_eq!(hub.listener_count(topics::UNMODAL), 1);
    }

    #[test]
    fn test_clear() {
        let hub = EventHub::new();
        let (seen, listener) = recorder();
        let _sub = hub.subscribe(topics::MODAL, listener);

        hub.clear();

        assert_eq!(hub.publish(topics::MODAL, None), 0);
        assert!(seen.borrow().is_empty());
    }
}
