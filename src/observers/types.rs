//! Observer handles and subscription types.

use crate::types::{Mutation, MutationKind};
use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::sync::{Arc, Weak};

/// Callback signature accepted by observers.
pub type Callback<K, V> = dyn Fn(&Mutation<K, V>) + Send + Sync;

/// Configuration for a channel-backed subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig<K> {
    /// Max buffered mutations before the subscriber is dropped.
    /// Default: 1000
    pub buffer_size: usize,

    /// Which mutations are delivered.
    pub filter: MutationFilter<K>,
}

impl<K> Default for SubscriptionConfig<K> {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            filter: MutationFilter::default(),
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug)]
pub struct MutationFilter<K> {
    /// Only deliver mutations of these keys (None = all keys).
    pub keys: Option<Vec<K>>,

    pub include_inserts: bool,
    pub include_updates: bool,
    pub include_removals: bool,
}

impl<K> MutationFilter<K> {
    /// Deliver every mutation.
    pub fn all() -> Self {
        Self {
            keys: None,
            include_inserts: true,
            include_updates: true,
            include_removals: true,
        }
    }

    /// Deliver every mutation of the given keys.
    pub fn keys(keys: Vec<K>) -> Self {
        Self {
            keys: Some(keys),
            ..Self::all()
        }
    }

    /// Deliver removals only.
    pub fn removals() -> Self {
        Self {
            keys: None,
            include_inserts: false,
            include_updates: false,
            include_removals: true,
        }
    }

    fn wants_kind(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Insert => self.include_inserts,
            MutationKind::Update => self.include_updates,
            MutationKind::Remove => self.include_removals,
        }
    }
}

impl<K: PartialEq> MutationFilter<K> {
    /// Check if a mutation passes this filter.
    pub fn matches<V>(&self, mutation: &Mutation<K, V>) -> bool {
        if !self.wants_kind(mutation.kind()) {
            return false;
        }

        match self.keys {
            Some(ref keys) => keys.contains(mutation.key()),
            None => true,
        }
    }
}

impl<K> Default for MutationFilter<K> {
    fn default() -> Self {
        Self::all()
    }
}

/// Why an observer was removed from the set without being disconnected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The weakly held callback was dropped.
    TargetDropped,
    /// The subscription receiver was dropped.
    Disconnected,
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
}

/// Outcome of handing one mutation to one observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    Filtered,
    Gone(DropReason),
}

enum Target<K, V> {
    Strong(Arc<Callback<K, V>>),
    Weak(Weak<Callback<K, V>>),
    Channel {
        sender: Sender<Mutation<K, V>>,
        filter: Arc<MutationFilter<K>>,
    },
}

/// A registered (or registrable) mutation observer.
///
/// Clones share identity: registering a clone of an already registered
/// observer is a no-op, and any clone can be used to disconnect it.
pub struct Observer<K, V> {
    target: Target<K, V>,
}

impl<K, V> Observer<K, V> {
    /// Wrap a closure.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Mutation<K, V>) + Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(callback))
    }

    /// Wrap a shared callback. Observers built from the same `Arc` are the
    /// same observer.
    pub fn from_arc(callback: Arc<Callback<K, V>>) -> Self {
        Self {
            target: Target::Strong(callback),
        }
    }

    /// Observe through a weak reference; the store does not keep the
    /// callback alive.
    pub fn weak(callback: &Arc<Callback<K, V>>) -> Self {
        Self {
            target: Target::Weak(Arc::downgrade(callback)),
        }
    }

    pub(crate) fn channel(sender: Sender<Mutation<K, V>>, filter: MutationFilter<K>) -> Self {
        Self {
            target: Target::Channel {
                sender,
                filter: Arc::new(filter),
            },
        }
    }

    /// Whether invoking this observer can still reach a callback.
    pub fn is_invocable(&self) -> bool {
        match &self.target {
            Target::Weak(weak) => weak.strong_count() > 0,
            Target::Strong(_) | Target::Channel { .. } => true,
        }
    }

    /// Identity comparison.
    pub fn same_as(&self, other: &Observer<K, V>) -> bool {
        match (&self.target, &other.target) {
            (Target::Strong(a), Target::Strong(b)) => Arc::ptr_eq(a, b),
            (Target::Weak(a), Target::Weak(b)) => Weak::ptr_eq(a, b),
            (Target::Strong(strong), Target::Weak(weak))
            | (Target::Weak(weak), Target::Strong(strong)) => {
                Arc::as_ptr(strong) as *const () == weak.as_ptr() as *const ()
            }
            (Target::Channel { sender: a, .. }, Target::Channel { sender: b, .. }) => {
                a.same_channel(b)
            }
            _ => false,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.target {
            Target::Strong(_) => "strong",
            Target::Weak(_) => "weak",
            Target::Channel { .. } => "channel",
        }
    }
}

impl<K, V> Observer<K, V>
where
    K: PartialEq + Clone,
    V: Clone,
{
    /// Hand a mutation to the observer.
    pub(crate) fn invoke(&self, mutation: &Mutation<K, V>) -> Delivery {
        match &self.target {
            Target::Strong(callback) => {
                callback(mutation);
                Delivery::Delivered
            }
            Target::Weak(weak) => match weak.upgrade() {
                Some(callback) => {
                    callback(mutation);
                    Delivery::Delivered
                }
                None => Delivery::Gone(DropReason::TargetDropped),
            },
            Target::Channel { sender, filter } => {
                if !filter.matches(mutation) {
                    return Delivery::Filtered;
                }
                match sender.try_send(mutation.clone()) {
                    Ok(()) => Delivery::Delivered,
                    Err(crossbeam_channel::TrySendError::Full(_)) => {
                        Delivery::Gone(DropReason::BufferOverflow)
                    }
                    Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                        Delivery::Gone(DropReason::Disconnected)
                    }
                }
            }
        }
    }
}

impl<K, V> Clone for Observer<K, V> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Strong(callback) => Target::Strong(Arc::clone(callback)),
            Target::Weak(weak) => Target::Weak(Weak::clone(weak)),
            Target::Channel { sender, filter } => Target::Channel {
                sender: sender.clone(),
                filter: Arc::clone(filter),
            },
        };
        Self { target }
    }
}

impl<K, V> fmt::Debug for Observer<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("kind", &self.kind_name())
            .field("invocable", &self.is_invocable())
            .finish()
    }
}

/// Handle to a channel-backed subscription.
pub struct Subscription<K, V> {
    observer: Observer<K, V>,
    /// Channel to receive mutations.
    pub receiver: Receiver<Mutation<K, V>>,
}

impl<K, V> Subscription<K, V> {
    pub(crate) fn new(observer: Observer<K, V>, receiver: Receiver<Mutation<K, V>>) -> Self {
        Self { observer, receiver }
    }

    /// The observer registered for this subscription.
    pub fn observer(&self) -> &Observer<K, V> {
        &self.observer
    }

    /// Receive the next mutation (blocking).
    pub fn recv(&self) -> Result<Mutation<K, V>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a mutation (non-blocking).
    pub fn try_recv(&self) -> Result<Mutation<K, V>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Mutation<K, V>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<Mutation<K, V>> {
        self.receiver.try_iter().collect()
    }
}
