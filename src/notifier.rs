//! Change notifier
//!
//! Subscribers are plain callbacks with no arguments; they re-query the
//! history themselves. Callbacks are invoked outside the registry lock, so a
//! callback may subscribe, unsubscribe or read the history.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Identifier of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

/// Synchronous publish/subscribe broadcaster
#[derive(Default)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
}

/// Handle returned by [`Notifier::subscribe`]
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove this subscriber. Returns `false` if it was already removed.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.lock();
        let before = registry.subscribers.len();
        registry.subscribers.retain(|(id, _)| *id != self.id);
        registry.subscribers.len() != before
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked after every successful mutation
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invoke every current subscriber once, in subscription order
    pub fn notify(&self) -> usize {
        let callbacks: Vec<Callback> = self
            .registry
            .lock()
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }

    /// Drop every subscriber
    pub fn clear(&self) {
        self.registry.lock().subscribers.clear();
    }
}
