use super::sources::Sources;
use crate::error::ReadOnlyStoreError;
use crate::store::{ListenerSet, Observable, Store, Unsubscribe};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Working state behind one derived store.
#[derive(Clone)]
struct Bookkeeping<D, T> {
    deps: D,
    prev_deps: Option<D>,
    state: T,
    prev_state: Option<T>,
}

struct Engine<D, T> {
    book: Store<Bookkeeping<D, T>>,
    listeners: Arc<ListenerSet<T>>,
    deps_subs: Mutex<Vec<Unsubscribe>>,
    disposed: AtomicBool,
    source_count: usize,
    // Held so that derived sources keep their own reactions alive.
    _sources: Box<dyn Any + Send + Sync>,
}

impl<D, T> Engine<D, T>
where
    D: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn react<F>(&self, index: usize, splice: &dyn Fn(&D) -> D, combine: &F)
    where
        F: Fn(&D, Option<&D>, Option<&T>) -> T,
    {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        let (book, _) = self.book.replace_with(|current| {
            let deps = splice(&current.deps);
            let prev_state = current.state.clone();
            let state = combine(&deps, Some(&current.deps), Some(&prev_state));
            Bookkeeping {
                deps,
                prev_deps: Some(current.deps.clone()),
                state,
                prev_state: Some(prev_state),
            }
        });

        tracing::trace!(
            source = index,
            listeners = self.listeners.len(),
            "derived store recomputed"
        );
        let prev = book.prev_state.as_ref().unwrap_or(&book.state);
        self.listeners.notify(&book.state, prev);
    }
}

impl<D, T> Engine<D, T> {
    fn release_sources(&self) {
        let subs = std::mem::take(
            &mut *self
                .deps_subs
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for sub in subs {
            sub.unsubscribe();
        }
    }
}

impl<D, T> Drop for Engine<D, T> {
    fn drop(&mut self) {
        self.release_sources();
    }
}

/// A read-only store whose value is computed from other stores.
///
/// Construction reads every source and computes the initial value with
/// `combine(deps, None, None)`. After that, each change of source `i`
/// rebuilds the dependency values with slot `i` replaced, computes
/// `combine(deps, Some(prev_deps), Some(prev_state))` and notifies every
/// listener of the derived store once.
///
/// Two source changes in a row mean two recomputations; nothing is batched.
///
/// # Examples
///
/// ```
/// use tincan_derived::{derive, Store};
///
/// let a = Store::new(2);
/// let b = Store::new(3);
/// let sum = derive((a.clone(), b.clone()), |deps: &(i32, i32), _, _| deps.0 + deps.1);
/// assert_eq!(sum.get_state(), 5);
///
/// b.set(10);
/// assert_eq!(sum.get_state(), 12);
/// assert!(sum.set_state(0).is_err());
/// ```
pub struct DerivedStore<D, T> {
    engine: Arc<Engine<D, T>>,
}

impl<D, T> DerivedStore<D, T>
where
    D: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Build a derived store over `sources`.
    pub fn new<S, F>(sources: S, combine: F) -> Self
    where
        S: Sources<Values = D>,
        F: Fn(&D, Option<&D>, Option<&T>) -> T + Send + Sync + 'static,
    {
        let deps = sources.snapshot();
        let state = combine(&deps, None, None);
        let source_count = sources.len();
        let combine = Arc::new(combine);

        let engine = Arc::new_cyclic(|engine: &Weak<Engine<D, T>>| {
            let engine = engine.clone();
            let deps_subs = sources.watch(move |index, splice| {
                if let Some(engine) = engine.upgrade() {
                    engine.react(index, splice, &*combine);
                }
            });

            Engine {
                book: Store::new(Bookkeeping {
                    deps,
                    prev_deps: None,
                    state,
                    prev_state: None,
                }),
                listeners: ListenerSet::new(),
                deps_subs: Mutex::new(deps_subs),
                disposed: AtomicBool::new(false),
                source_count,
                _sources: Box::new(sources),
            }
        });

        tracing::debug!(sources = source_count, "derived store created");
        Self { engine }
    }

    /// The current derived value.
    pub fn get_state(&self) -> T {
        self.engine.book.read(|book| book.state.clone())
    }

    /// Shorthand for [`DerivedStore::get_state`].
    pub fn get(&self) -> T {
        self.get_state()
    }

    /// Read the derived value without cloning it.
    ///
    /// Do not read or write any store from inside `f`.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.engine.book.read(|book| f(&book.state))
    }

    /// Subscribe to changes of the derived value.
    ///
    /// Listeners get `(state, prev_state)` once per source change. After
    /// [`DerivedStore::dispose`] the returned handle is inert and the
    /// listener is never called.
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        if self.is_disposed() {
            tracing::debug!("subscribe on a disposed derived store ignored");
            return Unsubscribe::detached();
        }
        self.engine.listeners.insert(listener)
    }

    /// Always fails: derived stores cannot be written to.
    pub fn set_state<P>(&self, _patch: P) -> Result<(), ReadOnlyStoreError> {
        tracing::debug!("write to derived store rejected");
        Err(ReadOnlyStoreError)
    }

    /// Stop listening to the sources and drop every listener.
    ///
    /// The value stays frozen at whatever it was when this was called.
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        if self.engine.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.engine.release_sources();
        self.engine.listeners.clear();
        tracing::debug!(sources = self.engine.source_count, "derived store disposed");
    }

    /// Whether [`DerivedStore::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.engine.disposed.load(Ordering::SeqCst)
    }

    /// Latest value of every source, in source order.
    pub fn deps_state(&self) -> D {
        self.engine.book.read(|book| book.deps.clone())
    }

    /// The source values as they were before the last recomputation.
    pub fn prev_deps_state(&self) -> Option<D> {
        self.engine.book.read(|book| book.prev_deps.clone())
    }

    /// The derived value before the last recomputation.
    pub fn prev_state(&self) -> Option<T> {
        self.engine.book.read(|book| book.prev_state.clone())
    }

    /// Number of source stores.
    pub fn source_count(&self) -> usize {
        self.engine.source_count
    }

    /// Number of listeners currently subscribed to the derived value.
    pub fn listener_count(&self) -> usize {
        self.engine.listeners.len()
    }
}

impl<D, T> Clone for DerivedStore<D, T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<D, T> fmt::Debug for DerivedStore<D, T>
where
    D: Clone + fmt::Debug + Send + Sync + 'static,
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.engine.book.read(|book| {
            f.debug_struct("DerivedStore")
                .field("state", &book.state)
                .field("deps", &book.deps)
                .field("disposed", &self.is_disposed())
                .finish()
        })
    }
}

impl<D, T> Observable for DerivedStore<D, T>
where
    D: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type State = T;

    fn get_state(&self) -> T {
        DerivedStore::get_state(self)
    }

    fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        DerivedStore::subscribe(self, listener)
    }
}

/// Build a read-only store computed from `sources`.
///
/// `combine` receives the current source values, the source values before
/// the change (`None` on the initial computation) and the previous derived
/// value (also `None` initially).
pub fn derive<S, T, F>(sources: S, combine: F) -> DerivedStore<S::Values, T>
where
    S: Sources,
    T: Clone + Send + Sync + 'static,
    F: Fn(&S::Values, Option<&S::Values>, Option<&T>) -> T + Send + Sync + 'static,
{
    DerivedStore::new(sources, combine)
}
