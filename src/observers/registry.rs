//! Observer registry: an ordered identity set with notification rounds.

use crate::error::{Result, StoreError};
use crate::types::Mutation;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::types::{Delivery, DropReason, Observer};

/// Summary of one notification round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Observers that received the mutation.
    pub delivered: usize,
    /// Subscriptions whose filter skipped the mutation.
    pub filtered: usize,
    /// Observers that panicked while handling the mutation.
    pub panicked: usize,
    /// Observers removed from the set after the round.
    pub dropped: usize,
}

/// Holds observers in registration order and broadcasts mutations to them.
pub struct ObserverRegistry<K, V> {
    /// Registered observers, oldest first. No two share identity.
    observers: RwLock<Vec<Observer<K, V>>>,
}

impl<K, V> ObserverRegistry<K, V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty registry with room for `capacity` observers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            observers: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    /// Add an observer. Returns false if it was already registered.
    pub fn register(&self, observer: &Observer<K, V>) -> Result<bool> {
        if !observer.is_invocable() {
            return Err(StoreError::InvalidCallback(
                "observer target has already been dropped".to_string(),
            ));
        }

        let mut observers = self.observers.write();
        if observers.iter().any(|existing| existing.same_as(observer)) {
            return Ok(false);
        }
        observers.push(observer.clone());
        Ok(true)
    }

    /// Remove an observer.
    pub fn unregister(&self, observer: &Observer<K, V>) -> Result<()> {
        let mut observers = self.observers.write();
        match observers.iter().position(|existing| existing.same_as(observer)) {
            Some(index) => {
                observers.remove(index);
                Ok(())
            }
            None => Err(StoreError::CallbackNotRegistered),
        }
    }

    /// Whether an observer with the same identity is registered.
    pub fn contains(&self, observer: &Observer<K, V>) -> bool {
        self.observers
            .read()
            .iter()
            .any(|existing| existing.same_as(observer))
    }

    /// Get observer count.
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Copy of the current set, in registration order.
    fn snapshot(&self) -> Vec<Observer<K, V>> {
        self.observers.read().clone()
    }

    fn prune(&self, gone: &[Observer<K, V>]) {
        let mut observers = self.observers.write();
        observers.retain(|existing| !gone.iter().any(|dead| dead.same_as(existing)));
    }
}

impl<K, V> ObserverRegistry<K, V>
where
    K: PartialEq + Clone,
    V: Clone,
{
    /// Hand a mutation to every observer registered when the round starts.
    ///
    /// No lock is held while callbacks run, so a callback may register or
    /// disconnect observers; those changes apply from the next round. A
    /// panicking callback does not stop the round. Observers that can no
    /// longer receive anything are removed once the round is over.
    pub fn notify(&self, mutation: &Mutation<K, V>) -> NotifyReport {
        let observers = self.snapshot();
        let mut report = NotifyReport::default();
        let mut gone = Vec::new();

        tracing::trace!(observers = observers.len(), "notifying observers");

        for observer in &observers {
            match catch_unwind(AssertUnwindSafe(|| observer.invoke(mutation))) {
                Ok(Delivery::Delivered) => report.delivered += 1,
                Ok(Delivery::Filtered) => report.filtered += 1,
                Ok(Delivery::Gone(reason)) => {
                    match reason {
                        DropReason::BufferOverflow => {
                            tracing::warn!(?reason, "dropping slow subscriber")
                        }
                        _ => tracing::debug!(?reason, "dropping unreachable observer"),
                    }
                    gone.push(observer.clone());
                }
                Err(_) => {
                    tracing::warn!(
                        kind = %mutation.kind(),
                        "observer panicked during notification"
                    );
                    report.panicked += 1;
                }
            }
        }

        if !gone.is_empty() {
            report.dropped = gone.len();
            self.prune(&gone);
        }

        report
    }
}

impl<K, V> Default for ObserverRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
