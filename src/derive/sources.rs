use crate::store::{Observable, Unsubscribe};

/// A fixed-size list of source stores.
///
/// Implemented for tuples of up to eight [`Observable`]s of any mix of
/// types, and for arrays of one [`Observable`] type. `Values` keeps the
/// same shape, so slot `i` of the values always has the type of source `i`.
pub trait Sources: Send + Sync + 'static {
    /// One current value per source, in source order.
    type Values: Clone + Send + Sync + 'static;

    /// Number of sources.
    fn len(&self) -> usize;

    /// Whether there are no sources at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read every source, in order.
    fn snapshot(&self) -> Self::Values;

    /// Subscribe `react` to every source.
    ///
    /// When source `i` changes, `react` is called with `i` and a splice
    /// function that builds a fresh `Values` from a given one with slot `i`
    /// replaced by the source's new value. The returned handles are in
    /// source order.
    fn watch<R>(&self, react: R) -> Vec<Unsubscribe>
    where
        R: Fn(usize, &dyn Fn(&Self::Values) -> Self::Values) + Clone + Send + Sync + 'static;
}

macro_rules! impl_sources_for_tuple {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: Observable),+> Sources for ($($name,)+) {
            type Values = ($($name::State,)+);

            fn len(&self) -> usize {
                $len
            }

            fn snapshot(&self) -> Self::Values {
                ($(self.$idx.get_state(),)+)
            }

            fn watch<R>(&self, react: R) -> Vec<Unsubscribe>
            where
                R: Fn(usize, &dyn Fn(&Self::Values) -> Self::Values)
                    + Clone
                    + Send
                    + Sync
                    + 'static,
            {
                vec![$({
                    let react = react.clone();
                    self.$idx.subscribe(move |state, _prev| {
                        react($idx, &|deps: &Self::Values| {
                            let mut next = deps.clone();
                            next.$idx = state.clone();
                            next
                        });
                    })
                }),+]
            }
        }
    };
}

impl_sources_for_tuple!(1; S0: 0);
impl_sources_for_tuple!(2; S0: 0, S1: 1);
impl_sources_for_tuple!(3; S0: 0, S1: 1, S2: 2);
impl_sources_for_tuple!(4; S0: 0, S1: 1, S2: 2, S3: 3);
impl_sources_for_tuple!(5; S0: 0, S1: 1, S2: 2, S3: 3, S4: 4);
impl_sources_for_tuple!(6; S0: 0, S1: 1, S2: 2, S3: 3, S4: 4, S5: 5);
impl_sources_for_tuple!(7; S0: 0, S1: 1, S2: 2, S3: 3, S4: 4, S5: 5, S6: 6);
impl_sources_for_tuple!(8; S0: 0, S1: 1, S2: 2, S3: 3, S4: 4, S5: 5, S6: 6, S7: 7);

impl<S: Observable, const N: usize> Sources for [S; N] {
    type Values = [S::State; N];

    fn len(&self) -> usize {
        N
    }

    fn snapshot(&self) -> Self::Values {
        std::array::from_fn(|index| self[index].get_state())
    }

    fn watch<R>(&self, react: R) -> Vec<Unsubscribe>
    where
        R: Fn(usize, &dyn Fn(&Self::Values) -> Self::Values) + Clone + Send + Sync + 'static,
    {
        self.iter()
            .enumerate()
            .map(|(index, source)| {
                let react = react.clone();
                source.subscribe(move |state, _prev| {
                    react(index, &|deps: &Self::Values| {
                        let mut next = deps.clone();
                        next[index] = state.clone();
                        next
                    });
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use std::sync::{Arc, Mutex};

    #[test]
    fn tuple_snapshot_keeps_types_and_order() {
        let sources = (Store::new(1u8), Store::new("two".to_string()), Store::new(3.0f64));
        assert_eq!(sources.len(), 3);
        assert_eq!(sources.snapshot(), (1u8, "two".to_string(), 3.0f64));
    }

    #[test]
    fn tuple_splice_replaces_only_its_slot() {
        let sources = (Store::new(1), Store::new('a'));
        let spliced = Arc::new(Mutex::new(Vec::new()));
        let base = sources.snapshot();

        let spliced_clone = spliced.clone();
        let handles = sources.watch(move |index, splice| {
            spliced_clone.lock().unwrap().push((index, splice(&base)));
        });
        assert_eq!(handles.len(), 2);

        sources.1.set('z');
        sources.0.set(7);
        assert_eq!(*spliced.lock().unwrap(), vec![(1, (1, 'z')), (0, (7, 'a'))]);
    }

    #[test]
    fn array_splice_replaces_only_its_slot() {
        let sources = [Store::new(0), Store::new(0), Store::new(0)];
        let spliced = Arc::new(Mutex::new(None));

        let spliced_clone = spliced.clone();
        let _handles = sources.watch(move |index, splice| {
            *spliced_clone.lock().unwrap() = Some((index, splice(&[1, 2, 3])));
        });

        sources[1].set(9);
        assert_eq!(*spliced.lock().unwrap(), Some((1, [1, 9, 3])));
    }

    #[test]
    fn handles_come_back_in_source_order() {
        let sources = [Store::new(0), Store::new(0)];
        let calls = Arc::new(Mutex::new(Vec::new()));

        let calls_clone = calls.clone();
        let mut handles = sources.watch(move |index, _| {
            calls_clone.lock().unwrap().push(index);
        });

        handles.remove(0).unsubscribe();
        sources[0].set(1);
        sources[1].set(1);
        assert_eq!(*calls.lock().unwrap(), vec![1]);
    }

    #[test]
    fn empty_array_has_no_sources() {
        let sources: [Store<i32>; 0] = [];
        assert!(sources.is_empty());
        assert!(sources.watch(|_, _| {}).is_empty());
    }
}
