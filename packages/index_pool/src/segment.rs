use std::any::type_name;
use std::iter;

/// One fixed-capacity chunk of backing storage for a `SegmentedList`.
///
/// The occupied slots are always the first `count` slots. Segments are filled front to back and
/// drained back to front, so there are never holes inside a segment. Every slot holds a value at
/// all times; vacant slots hold whatever the owner last left there, which the owning list keeps
/// at `T::default()`.
#[derive(Debug)]
pub(crate) struct Segment<T> {
    slots: Box<[T]>,

    /// Number of occupied leading slots.
    count: usize,
}

impl<T: Default> Segment<T> {
    /// Creates an empty segment with `capacity` slots, each holding `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Segment must have non-zero capacity");

        Self {
            slots: iter::repeat_with(T::default).take(capacity).collect(),
            count: 0,
        }
    }
}

impl<T> Segment<T> {
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub(crate) fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Marks the first vacant slot as occupied and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the segment is full.
    pub(crate) fn claim(&mut self) -> &mut T {
        assert!(
            !self.is_full(),
            "cannot claim a slot in a full segment of {}",
            type_name::<T>()
        );

        let index = self.count;
        self.count = index
            .checked_add(1)
            .expect("guarded by the full check above");

        self.slot_mut(index)
    }

    /// Marks the last occupied slot as vacant. The value in the slot is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the segment is empty.
    pub(crate) fn retract(&mut self) {
        self.count = self.count.checked_sub(1).unwrap_or_else(|| {
            panic!(
                "cannot retract a slot from an empty segment of {}",
                type_name::<T>()
            )
        });
    }

    /// # Panics
    ///
    /// Panics if `index` is beyond the segment capacity.
    #[must_use]
    pub(crate) fn slot(&self, index: usize) -> &T {
        self.slots.get(index).unwrap_or_else(|| {
            panic!(
                "slot {index} index out of bounds in segment of {}",
                type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if `index` is beyond the segment capacity.
    #[must_use]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut T {
        self.slots.get_mut(index).unwrap_or_else(|| {
            panic!(
                "slot {index} index out of bounds in segment of {}",
                type_name::<T>()
            )
        })
    }
}
