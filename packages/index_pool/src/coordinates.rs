use crate::DEFAULT_SEGMENT_SIZE;
use crate::bits::{power_of_two_shift, round_up_to_power_of_two};

/// Shape of the segments in a segmented collection.
///
/// The segment size is always a power of two, so translating a global index into coordinates
/// is a shift and a mask instead of a division.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SegmentGeometry {
    size: usize,
    mask: usize,
    shift: u32,
}

impl SegmentGeometry {
    /// # Panics
    ///
    /// Panics if rounding `requested_size` up to a power of two overflows `usize`.
    #[must_use]
    pub(crate) fn new(requested_size: usize) -> Self {
        let requested_size = if requested_size == 0 {
            DEFAULT_SEGMENT_SIZE
        } else {
            requested_size
        };

        let size = round_up_to_power_of_two(requested_size).unwrap_or_else(|| {
            panic!("segment size {requested_size} cannot be rounded up to a power of two")
        });

        Self {
            size,
            mask: size.wrapping_sub(1),
            shift: power_of_two_shift(size),
        }
    }

    #[must_use]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub(crate) fn coordinates_of(&self, index: usize) -> SlotCoordinates {
        SlotCoordinates {
            segment_index: index >> self.shift,
            index_in_segment: index & self.mask,
        }
    }
}

/// Location of a slot within a segmented collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SlotCoordinates {
    /// The index of the segment containing this slot.
    pub(crate) segment_index: usize,
    /// The index within the segment where this slot is stored.
    pub(crate) index_in_segment: usize,
}
