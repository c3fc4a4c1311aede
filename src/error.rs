//! Error types.

use thiserror::Error;

/// Returned by every write attempted on a derived store.
///
/// A derived store's value is a function of its sources, so there is
/// nothing a caller could write that would survive the next source change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("derived stores are read-only")]
pub struct ReadOnlyStoreError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_message() {
        assert_eq!(ReadOnlyStoreError.to_string(), "derived stores are read-only");
    }
}
