//! # Observable Store
//!
//! An in-memory key-value store that tells registered observers about every
//! insert, update, and removal, so code can track shared state without
//! polling.
//!
//! ## Core Concepts
//!
//! - **Store**: owns the entries and the observer set
//! - **Mutations**: immutable records of one change (key, old value, new value)
//! - **Observers**: callbacks or channel subscriptions, notified in
//!   registration order after each successful change
//!
//! `None` plays the role of "absent": `get` returns `None` for unknown keys,
//! and `set(key, None)` deletes.
//!
//! ## Example
//!
//! ```
//! use observable_store::{Mutation, Observer, Store};
//!
//! let store: Store<String, i32> = Store::new();
//!
//! let observer = Observer::new(|mutation: &Mutation<String, i32>| {
//!     println!("{} changed to {:?}", mutation.key(), mutation.new_value());
//! });
//! store.observe(&observer).unwrap();
//!
//! store.set("answer".to_string(), 42).unwrap();
//! assert_eq!(store.get(&"answer".to_string()), Some(42));
//!
//! store.delete(&"answer".to_string()).unwrap();
//! assert!(store.delete(&"answer".to_string()).is_err());
//! ```

pub mod error;
pub mod observers;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use observers::{
    Callback, DropReason, MutationFilter, NotifyReport, Observer, ObserverRegistry,
    Subscription, SubscriptionConfig,
};
pub use store::{Store, StoreConfig};
pub use types::{Mutation, MutationKind};
