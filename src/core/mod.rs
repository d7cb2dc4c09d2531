//! Core primitives shared across the editor: time representation, id
//! allocation, and the observer registry. All time values are nanoseconds
//! (i64).

pub mod id;
pub mod observer;
pub mod time;

pub use id::IdGen;
pub use observer::{ObserverRegistry, SubscriptionToken};
pub use time::{Time, ZERO};
