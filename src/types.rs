//! Core types for the observable store.

use serde::Serialize;
use std::fmt;

/// What a mutation did to its key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// The key was absent and now holds a value.
    Insert,
    /// The key held a value and was overwritten.
    Update,
    /// The key held a value and was removed.
    Remove,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Insert => "insert",
            MutationKind::Update => "update",
            MutationKind::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Snapshot of one committed mutation, handed to every observer.
///
/// `None` stands for "absent": an insert has no old value and a removal has
/// no new value. Records are only built by the store after the change has
/// been applied, so observers never see a mutation that failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mutation<K, V> {
    key: K,
    old_value: Option<V>,
    new_value: Option<V>,
}

impl<K, V> Mutation<K, V> {
    pub(crate) fn new(key: K, old_value: Option<V>, new_value: Option<V>) -> Self {
        Self {
            key,
            old_value,
            new_value,
        }
    }

    /// The affected key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Value held before the mutation, if any.
    pub fn old_value(&self) -> Option<&V> {
        self.old_value.as_ref()
    }

    /// Value held after the mutation, or `None` for a removal.
    pub fn new_value(&self) -> Option<&V> {
        self.new_value.as_ref()
    }

    /// Classify the mutation as an insert, update, or removal.
    pub fn kind(&self) -> MutationKind {
        match (&self.old_value, &self.new_value) {
            (_, None) => MutationKind::Remove,
            (None, Some(_)) => MutationKind::Insert,
            (Some(_), Some(_)) => MutationKind::Update,
        }
    }

    /// Whether the key was removed.
    pub fn is_removal(&self) -> bool {
        self.new_value.is_none()
    }

    /// Consume the record, returning `(key, old_value, new_value)`.
    pub fn into_parts(self) -> (K, Option<V>, Option<V>) {
        (self.key, self.old_value, self.new_value)
    }
}
