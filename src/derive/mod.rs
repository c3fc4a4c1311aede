//! Derived stores.
//!
//! A [`DerivedStore`] listens to a fixed list of source stores and keeps a
//! value computed from their current values. It can be read and subscribed
//! to like any store, but never written.

mod derived;
mod sources;

pub use derived::{derive, DerivedStore};
pub use sources::Sources;
