//! Change notifications for cart subscribers.
//!
//! UI layers register a listener with [`Cart::subscribe`](super::Cart::subscribe)
//! to refresh badges or play the add-to-cart pulse. Listeners run
//! synchronously, in registration order, after the snapshot is persisted.

use core::fmt;

use serde::Serialize;
use spacegoods_core::ProductId;

/// What changed in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CartEvent {
    /// Units of `id` were added; `count` is the new total.
    ItemAdded {
        id: ProductId,
        quantity: u32,
        count: u32,
    },
    /// The line for `id` was removed; `count` is the new total.
    ItemRemoved { id: ProductId, count: u32 },
    /// Every line was removed.
    Cleared,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&CartEvent) + Send>;

/// Registered listeners.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn notify(&self, event: &CartEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            subscribers.subscribe(Box::new(move |_| {
                seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(tag);
            }));
        }

        subscribers.notify(&CartEvent::Cleared);
        let seen = seen.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(*seen, vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut subscribers = Subscribers::default();
        let id = subscribers.subscribe(Box::new(|_| {}));
        assert_eq!(subscribers.len(), 1);

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        assert_eq!(subscribers.len(), 0);
    }
}
