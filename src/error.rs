//! Error types for the observable store.

use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid callback: {0}")]
    InvalidCallback(String),

    #[error("Callback is not registered")]
    CallbackNotRegistered,
}

impl StoreError {
    pub(crate) fn key_not_found<K: std::fmt::Debug>(key: &K) -> Self {
        StoreError::KeyNotFound(format!("{:?}", key))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
