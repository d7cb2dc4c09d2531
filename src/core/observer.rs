//! Token-keyed observer registry.
//!
//! Subscribers receive events over crossbeam channels and unsubscribe by the
//! token handed out at subscription time, so teardown is deterministic and
//! does not depend on closure identity.

use crossbeam::channel::{unbounded, Receiver, Sender};

/// Opaque subscription token returned by [`ObserverRegistry::subscribe`].
pub type SubscriptionToken = u64;

/// Registry of event subscribers keyed by stable tokens.
#[derive(Debug)]
pub struct ObserverRegistry<E: Clone> {
    next_token: SubscriptionToken,
    subscribers: Vec<(SubscriptionToken, Sender<E>)>,
}

impl<E: Clone> ObserverRegistry<E> {
    pub fn new() -> Self {
        Self {
            next_token: 1,
            subscribers: Vec::new(),
        }
    }

    /// Register a new subscriber. Returns the unsubscribe token and the
    /// receiving end of the event channel.
    pub fn subscribe(&mut self) -> (SubscriptionToken, Receiver<E>) {
        let token = self.next_token;
        self.next_token += 1;
        let (tx, rx) = unbounded();
        self.subscribers.push((token, tx));
        (token, rx)
    }

    /// Remove a subscriber by token. Returns `false` if the token is unknown.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(t, _)| *t != token);
        self.subscribers.len() != before
    }

    /// Deliver an event to every live subscriber. Subscribers whose receiver
    /// has been dropped are pruned.
    pub fn emit(&mut self, event: E) {
        self.subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E: Clone> Default for ObserverRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_emit() {
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        let (_token, rx) = registry.subscribe();

        registry.emit(7);
        assert_eq!(rx.try_recv().unwrap(), 7);
    }

    #[test]
    fn test_unsubscribe_by_token() {
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        let (token, rx) = registry.subscribe();

        assert!(registry.unsubscribe(token));
        assert!(!registry.unsubscribe(token)); // already gone

        registry.emit(1);
        assert!(rx.try_recv().is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let mut registry: ObserverRegistry<u32> = ObserverRegistry::new();
        let (_token, rx) = registry.subscribe();
        drop(rx);

        registry.emit(1);
        assert!(registry.is_empty());
    }
}
