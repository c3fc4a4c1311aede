use super::listeners::{ListenerSet, Unsubscribe};
use super::observable::Observable;
use std::sync::{Arc, PoisonError, RwLock};

/// Shallow merge of a patch into a state value.
///
/// Implement this for the patch shapes a state accepts, typically a struct
/// of `Option` fields where `None` means "leave as is".
///
/// ```
/// use tincan_derived::{Merge, Store};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// #[derive(Default)]
/// struct UserPatch {
///     name: Option<String>,
///     age: Option<u32>,
/// }
///
/// impl Merge<UserPatch> for User {
///     fn merge(&mut self, patch: UserPatch) {
///         if let Some(name) = patch.name {
///             self.name = name;
///         }
///         if let Some(age) = patch.age {
///             self.age = age;
///         }
///     }
/// }
///
/// let store = Store::new(User { name: "ada".into(), age: 36 });
/// store.set_state(UserPatch { age: Some(37), ..Default::default() });
/// assert_eq!(store.get_state(), User { name: "ada".into(), age: 37 });
/// ```
pub trait Merge<P = Self> {
    /// Overwrite the fields present in `patch`, keep the rest.
    fn merge(&mut self, patch: P);
}

/// A thread-safe observable state container.
///
/// Every write replaces the state and then notifies each listener with the
/// new and previous value. Listeners run after the write lock is released,
/// so they may read or write any store, this one included.
pub struct Store<T> {
    state: Arc<RwLock<T>>,
    listeners: Arc<ListenerSet<T>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            listeners: ListenerSet::new(),
        }
    }

    /// Get a clone of the current state.
    pub fn get_state(&self) -> T {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Shorthand for [`Store::get_state`].
    pub fn get(&self) -> T {
        self.get_state()
    }

    /// Read state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&*state)
    }

    /// Replace the whole state.
    pub fn set(&self, new_state: T) {
        self.replace_with(move |_| new_state);
    }

    /// Shallow-merge `patch` into the current state.
    pub fn set_state<P>(&self, patch: P)
    where
        T: Merge<P>,
    {
        self.update(move |state| state.merge(patch));
    }

    /// Update the state in place using a function.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.replace_with(move |current| {
            let mut next = current.clone();
            f(&mut next);
            next
        });
    }

    /// Subscribe to state changes.
    ///
    /// The listener is called with `(state, prev_state)` after every write
    /// that starts once this call returns.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.listeners.insert(listener)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Compute the next state from the current one under the write lock,
    /// then notify. Returns `(state, prev_state)`.
    ///
    /// `f` runs before anything is written, so a panic inside it leaves the
    /// current state untouched.
    pub(crate) fn replace_with<F>(&self, f: F) -> (T, T)
    where
        F: FnOnce(&T) -> T,
    {
        let (state, prev) = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = f(&*guard);
            let prev = std::mem::replace(&mut *guard, next.clone());
            (next, prev)
        };

        tracing::trace!(listeners = self.listeners.len(), "store notified");
        self.listeners.notify(&state, &prev);
        (state, prev)
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable for Store<T> {
    type State = T;

    fn get_state(&self) -> T {
        Store::get_state(self)
    }

    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        Store::subscribe(self, listener)
    }
}
