//! # Tincan Derived
//!
//! Read-only stores computed from other stores.
//!
//! ## Store (source state)
//!
//! - `Store<T>` - Thread-safe state container with whole, in-place and
//!   merged writes
//! - Listeners receive the new and the previous value
//! - `subscribe` hands back an `Unsubscribe` handle
//!
//! ## Derived stores
//!
//! - `derive(sources, combine)` - Build a `DerivedStore` from a tuple or
//!   array of stores
//! - Recomputed once per source change, then fanned out to its listeners
//! - Writes fail with `ReadOnlyStoreError`
//! - Derived stores are themselves `Observable`, so they can feed other
//!   derived stores

pub mod derive;
pub mod error;
pub mod store;

// Re-export main types for convenience
pub use derive::{derive, DerivedStore, Sources};
pub use error::ReadOnlyStoreError;
pub use store::{Merge, Observable, Store, Unsubscribe};
