use thiserror::Error;

/// Errors reported by the checked (`try_`) operations of the pools and the segmented list.
///
/// The unchecked counterparts of these operations panic with the same message, because hitting
/// one of these conditions there means the caller has lost track of which indices it owns.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The index does not refer to a slot the collection has handed out.
    #[error("index {index} is out of range, valid indices end before {end}")]
    IndexOutOfRange {
        /// The index the caller asked for.
        index: usize,

        /// The exclusive upper bound of the valid indices at the time of the call.
        end: usize,
    },

    /// The index was never handed out by the pool, or is the reserved sentinel index.
    #[error("cannot release invalid index {index}, next unused index is {next_unused}")]
    InvalidRelease {
        /// The index the caller tried to release.
        index: usize,

        /// The lowest index the pool has never handed out (or has since reclaimed).
        next_unused: usize,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn invalid_release_names_both_indices() {
        let error = Error::InvalidRelease {
            index: 7,
            next_unused: 3,
        };

        assert_eq!(
            error.to_string(),
            "cannot release invalid index 7, next unused index is 3"
        );
    }

    #[test]
    fn out_of_range_names_index_and_end() {
        let error = Error::IndexOutOfRange { index: 4, end: 4 };

        assert_eq!(
            error.to_string(),
            "index 4 is out of range, valid indices end before 4"
        );
    }
}
