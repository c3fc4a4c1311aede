//! Base observable stores.
//!
//! A [`Store`] holds one value, accepts whole, in-place and merged writes,
//! and notifies its listeners with the new and previous value after each.

mod listeners;
mod observable;
mod store;

pub(crate) use listeners::ListenerSet;
pub use listeners::Unsubscribe;
pub use observable::Observable;
pub use store::{Merge, Store};
