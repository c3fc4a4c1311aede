//! Listener registry shared by base and derived stores.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// A store listener, called with the new state and the previous state.
type Listener<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

struct Entry<T> {
    id: usize,
    // Shared by every copy of the entry, snapshots included.
    live: Arc<AtomicBool>,
    listener: Listener<T>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            live: Arc::clone(&self.live),
            listener: Arc::clone(&self.listener),
        }
    }
}

type Entries<T> = Arc<Vec<Entry<T>>>;

/// Ordered registry of listeners.
///
/// Adding a listener publishes a new entry list instead of touching the
/// current one, so a notification already walking a snapshot never sees
/// it. Removal clears the entry's live flag before dropping it from the
/// list, so an in-flight notification skips it from that point on.
pub(crate) struct ListenerSet<T> {
    next_id: AtomicUsize,
    entries: RwLock<Entries<T>>,
}

impl<T: 'static> ListenerSet<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicUsize::new(0),
            entries: RwLock::new(Arc::new(Vec::new())),
        })
    }

    /// Register a listener and return the handle that removes it.
    pub(crate) fn insert<F>(self: &Arc<Self>, listener: F) -> Unsubscribe
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let mut next = Vec::with_capacity(entries.len() + 1);
            next.extend(entries.iter().cloned());
            next.push(Entry {
                id,
                live: Arc::new(AtomicBool::new(true)),
                listener: Arc::new(listener),
            });
            *entries = Arc::new(next);
        }

        let set: Weak<Self> = Arc::downgrade(self);
        Unsubscribe::new(move || {
            if let Some(set) = set.upgrade() {
                set.remove(id);
            }
        })
    }

    fn remove(&self, id: usize) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.iter().find(|entry| entry.id == id) {
            entry.live.store(false, Ordering::SeqCst);
        }
        Arc::make_mut(&mut *entries).retain(|entry| entry.id != id);
    }

    /// The entries as of now. Later inserts do not affect it; later removals
    /// only mark the removed entries as dead.
    fn snapshot(&self) -> Entries<T> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Call every listener registered when the notification starts and not
    /// removed before its turn comes.
    pub(crate) fn notify(&self, state: &T, prev: &T) {
        let snapshot = self.snapshot();
        for entry in snapshot.iter() {
            if entry.live.load(Ordering::SeqCst) {
                (entry.listener)(state, prev);
            }
        }
    }

    pub(crate) fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter() {
            entry.live.store(false, Ordering::SeqCst);
        }
        *entries = Arc::new(Vec::new());
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Handle returned by `subscribe`.
///
/// Calling [`Unsubscribe::unsubscribe`] removes exactly the listener it was
/// created for. Dropping the handle without calling it leaves the listener
/// registered for as long as the store lives.
pub struct Unsubscribe {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Unsubscribe {
    pub(crate) fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A handle with nothing to remove.
    pub(crate) fn detached() -> Self {
        Self { detach: None }
    }

    /// Whether calling [`Unsubscribe::unsubscribe`] would remove anything.
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    /// Remove the listener.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}
