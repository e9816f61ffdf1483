/// Rounds `value` up to the nearest power of two.
///
/// Zero rounds up to one, powers of two are returned unchanged. Returns `None` if the result
/// does not fit in `usize`.
#[must_use]
pub(crate) fn round_up_to_power_of_two(value: usize) -> Option<usize> {
    value.checked_next_power_of_two()
}

/// Base-2 logarithm of a power of two, i.e. the shift that turns an index into a multiple of
/// `value`.
///
/// # Panics
///
/// Panics if `value` is not a power of two.
#[must_use]
pub(crate) fn power_of_two_shift(value: usize) -> u32 {
    assert!(
        value.is_power_of_two(),
        "{value} is not a power of two, cannot derive a shift from it"
    );

    value.trailing_zeros()
}
