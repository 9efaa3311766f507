//! Observer system for store mutations.
//!
//! Every committed mutation is handed to the registered observers, in
//! registration order. Three kinds of observer exist:
//! - Strong callbacks, kept alive by the store
//! - Weak callbacks, removed once their target is dropped
//! - Channel subscriptions with a bounded buffer and an optional filter
//!
//! # Example
//!
//! ```ignore
//! let store: Store<String, i32> = Store::new();
//!
//! let observer = Observer::new(|mutation: &Mutation<String, i32>| {
//!     println!("{:?} -> {:?}", mutation.old_value(), mutation.new_value());
//! });
//! store.observe(&observer)?;
//!
//! let subscription = store.subscribe(SubscriptionConfig {
//!     filter: MutationFilter::removals(),
//!     ..Default::default()
//! })?;
//! while let Ok(mutation) = subscription.try_recv() {
//!     println!("removed {}", mutation.key());
//! }
//! ```

mod registry;
mod types;

pub use registry::{NotifyReport, ObserverRegistry};
pub use types::{
    Callback, DropReason, MutationFilter, Observer, Subscription, SubscriptionConfig,
};
