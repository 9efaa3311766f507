//! Main Store struct tying the map and the observers together.

use crate::error::{Result, StoreError};
use crate::observers::{Observer, ObserverRegistry, Subscription, SubscriptionConfig};
use crate::types::Mutation;
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Store configuration.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    /// Number of entries to preallocate.
    pub initial_capacity: usize,

    /// Number of observers to preallocate.
    pub observer_capacity: usize,
}

/// The observable key-value store.
///
/// Provides:
/// - Reads that never notify
/// - Writes and deletes that notify every observer after they commit
/// - Observer registration and removal
///
/// Writes are serialized by a re-entrant lock held until all observers have
/// run, so notification rounds never interleave. An observer may call back
/// into the store on the same thread; the nested mutation notifies before
/// the outer round continues. Observer registration and removal take the
/// same lock, so once `disconnect` returns the observer is never invoked
/// again. An observer must not wait on another thread that mutates or
/// (dis)connects on the same store: that thread blocks on the write lock
/// until the round ends, and the round never ends.
pub struct Store<K, V> {
    /// Key-value data.
    entries: RwLock<HashMap<K, V>>,

    /// Registered observers.
    observers: ObserverRegistry<K, V>,

    /// Lock for write operations to ensure commit + notify atomicity.
    write_lock: ReentrantMutex<()>,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with preallocated capacity.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            observers: ObserverRegistry::with_capacity(config.observer_capacity),
            write_lock: ReentrantMutex::new(()),
        }
    }

    // --- Reads ---

    /// Get the value stored under `key`, or `None` if absent.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Whether `key` currently holds a value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All keys, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.entries.read().keys().cloned().collect()
    }

    /// Copy of every entry.
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.entries.read().clone()
    }

    // --- Writes ---

    /// Store `value` under `key`, or delete the key if `value` is `None`.
    ///
    /// Writing a value always succeeds (insert or overwrite) and returns the
    /// previous value. Writing `None` behaves exactly like [`Store::delete`]
    /// and fails with `KeyNotFound` if the key is absent.
    pub fn set(&self, key: K, value: impl Into<Option<V>>) -> Result<Option<V>> {
        let value = match value.into() {
            Some(value) => value,
            None => return self.delete(&key).map(Some),
        };

        let _lock = self.write_lock.lock();

        let old_value = self.entries.write().insert(key.clone(), value.clone());
        let mutation = Mutation::new(key, old_value.clone(), Some(value));
        self.commit(&mutation);

        Ok(old_value)
    }

    /// Remove `key`, returning the value it held.
    pub fn delete(&self, key: &K) -> Result<V> {
        let _lock = self.write_lock.lock();

        let removed = self.entries.write().remove(key);
        let old_value = match removed {
            Some(value) => value,
            None => {
                tracing::debug!(?key, "delete of absent key");
                return Err(StoreError::key_not_found(key));
            }
        };

        let mutation = Mutation::new(key.clone(), Some(old_value.clone()), None);
        self.commit(&mutation);

        Ok(old_value)
    }

    /// Notify observers of an applied mutation. Entry locks are released by
    /// the time this runs.
    fn commit(&self, mutation: &Mutation<K, V>) {
        tracing::debug!(key = ?mutation.key(), kind = %mutation.kind(), "mutation committed");

        if self.observers.is_empty() {
            return;
        }

        let report = self.observers.notify(mutation);
        tracing::trace!(
            delivered = report.delivered,
            filtered = report.filtered,
            panicked = report.panicked,
            dropped = report.dropped,
            "notification round finished"
        );
    }

    // --- Observers ---

    /// Register an observer. Registering one that is already present is a
    /// no-op; it will still be invoked once per mutation.
    pub fn observe(&self, observer: &Observer<K, V>) -> Result<()> {
        let _lock = self.write_lock.lock();

        if self.observers.register(observer)? {
            tracing::debug!(?observer, "observer registered");
        }
        Ok(())
    }

    /// Remove an observer. Waits for an in-flight notification round on
    /// another thread to finish first.
    pub fn disconnect(&self, observer: &Observer<K, V>) -> Result<()> {
        let _lock = self.write_lock.lock();

        self.observers.unregister(observer)?;
        tracing::debug!(?observer, "observer disconnected");
        Ok(())
    }

    /// Alias for [`Store::disconnect`].
    pub fn unobserve(&self, observer: &Observer<K, V>) -> Result<()> {
        self.disconnect(observer)
    }

    /// Open a channel subscription.
    ///
    /// The subscriber is dropped from the observer set if its buffer fills
    /// up or its receiver is dropped.
    pub fn subscribe(&self, config: SubscriptionConfig<K>) -> Result<Subscription<K, V>> {
        if config.buffer_size == 0 {
            return Err(StoreError::InvalidCallback(
                "subscription buffer size must be non-zero".to_string(),
            ));
        }

        let (sender, receiver) = crossbeam_channel::bounded(config.buffer_size);
        let observer = Observer::channel(sender, config.filter);
        self.observe(&observer)?;

        Ok(Subscription::new(observer, receiver))
    }

    /// Close a channel subscription.
    pub fn unsubscribe(&self, subscription: &Subscription<K, V>) -> Result<()> {
        self.disconnect(subscription.observer())
    }

    /// Whether `observer` is currently registered.
    pub fn is_observing(&self, observer: &Observer<K, V>) -> bool {
        self.observers.contains(observer)
    }

    /// Get observer count.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl<K, V> Default for Store<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Store<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.entries.read().len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
