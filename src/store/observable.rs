use super::listeners::Unsubscribe;

/// Anything that can be read and listened to.
///
/// Both [`Store`](crate::Store) and [`DerivedStore`](crate::DerivedStore)
/// implement this, which is what lets a derived store be the source of
/// another one.
pub trait Observable: Clone + Send + Sync + 'static {
    /// The value held by the store.
    type State: Clone + Send + Sync + 'static;

    /// A clone of the current value.
    fn get_state(&self) -> Self::State;

    /// Register a listener called with `(state, prev_state)` on every change.
    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&Self::State, &Self::State) + Send + Sync + 'static;
}
