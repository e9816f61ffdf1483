use std::mem;

use tracing::debug;

use crate::coordinates::SegmentGeometry;
use crate::segment::Segment;
use crate::{Error, Result};

/// Segment size used when the caller does not ask for a specific one.
pub const DEFAULT_SEGMENT_SIZE: usize = 128;

/// A growable list that stores its items in fixed-size segments instead of one contiguous array.
///
/// Growing the list never moves existing items: when the last segment is full, a new segment is
/// allocated and the old ones stay where they are. The segment size is always a power of two, so
/// looking up an item by index is a shift and a mask.
///
/// Items are added and removed at the tail. [`fast_remove_at()`][1] removes an item from the middle
/// in constant time by moving the tail item into the hole, which does not preserve item order.
///
/// # Spare segment
///
/// When removals drain a segment, the list keeps that one empty segment around instead of
/// releasing it, so alternating between adding and removing an item right at a segment boundary
/// does not allocate and free a segment every time. Any further empty segment is released.
///
/// # Example
///
/// ```rust
/// use index_pool::SegmentedList;
///
/// let mut list = SegmentedList::<u32>::with_segment_size(4);
///
/// for value in 0..5 {
///     list.push(value * 10);
/// }
///
/// assert_eq!(list.len(), 5);
/// assert_eq!(list.segment_count(), 2);
/// assert_eq!(*list.get(4), 40);
///
/// // The tail item moves into the hole.
/// let removed = list.fast_remove_at(0);
/// assert_eq!(removed, 0);
/// assert_eq!(*list.get(0), 40);
/// assert_eq!(list.len(), 4);
/// ```
///
/// [1]: Self::fast_remove_at
#[derive(Debug)]
pub struct SegmentedList<T> {
    segments: Vec<Segment<T>>,

    geometry: SegmentGeometry,

    /// Total number of items across all segments.
    count: usize,

    /// Index of the segment that receives the next item. All segments before it are full. It is
    /// either the only segment or a non-full one, except right after it has been filled up, in
    /// which case the next allocation moves it forward.
    cursor: usize,
}

impl<T> SegmentedList<T> {
    /// Creates an empty list with [`DEFAULT_SEGMENT_SIZE`] items per segment.
    ///
    /// No memory is allocated until the first item is added.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::{DEFAULT_SEGMENT_SIZE, SegmentedList};
    ///
    /// let list = SegmentedList::<u64>::new();
    ///
    /// assert!(list.is_empty());
    /// assert_eq!(list.segment_size(), DEFAULT_SEGMENT_SIZE);
    /// assert_eq!(list.capacity(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_segment_size(DEFAULT_SEGMENT_SIZE)
    }

    /// Creates an empty list whose segments hold at least `segment_size` items each.
    ///
    /// The segment size is rounded up to the nearest power of two. A size of zero selects
    /// [`DEFAULT_SEGMENT_SIZE`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::SegmentedList;
    ///
    /// let list = SegmentedList::<u64>::with_segment_size(100);
    ///
    /// assert_eq!(list.segment_size(), 128);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the segment size cannot be rounded up to a power of two without overflowing.
    #[must_use]
    pub fn with_segment_size(segment_size: usize) -> Self {
        Self {
            segments: Vec::new(),
            geometry: SegmentGeometry::new(segment_size),
            count: 0,
            cursor: 0,
        }
    }

    /// The number of items in the list.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the list is empty. An empty list may still hold a spare segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The number of items each segment holds. Always a power of two.
    #[must_use]
    pub fn segment_size(&self) -> usize {
        self.geometry.size()
    }

    /// The number of segments currently allocated, including a spare empty one if present.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The number of items the list can hold without allocating another segment.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.segments
            .len()
            .checked_mul(self.geometry.size())
            .expect("overflow here would mean the list holds more items than virtual memory can fit")
    }

    /// Gets a shared reference to the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`][Self::len].
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        self.try_get(index).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Gets an exclusive reference to the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`][Self::len].
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.try_get_mut(index).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Gets a shared reference to the item at `index`, or an error if there is no such item.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::{Error, SegmentedList};
    ///
    /// let mut list = SegmentedList::<u32>::new();
    /// list.push(7);
    ///
    /// assert_eq!(list.try_get(0).ok(), Some(&7));
    /// assert!(matches!(
    ///     list.try_get(1),
    ///     Err(Error::IndexOutOfRange { index: 1, end: 1 })
    /// ));
    /// ```
    pub fn try_get(&self, index: usize) -> Result<&T> {
        self.check_in_range(index)?;

        let coordinates = self.geometry.coordinates_of(index);

        Ok(self
            .segments
            .get(coordinates.segment_index)
            .expect("every index below the item count maps to an existing segment")
            .slot(coordinates.index_in_segment))
    }

    /// Gets an exclusive reference to the item at `index`, or an error if there is no such item.
    pub fn try_get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_in_range(index)?;

        let coordinates = self.geometry.coordinates_of(index);

        Ok(self
            .segments
            .get_mut(coordinates.segment_index)
            .expect("every index below the item count maps to an existing segment")
            .slot_mut(coordinates.index_in_segment))
    }

    fn check_in_range(&self, index: usize) -> Result<()> {
        if index >= self.count {
            return Err(Error::IndexOutOfRange {
                index,
                end: self.count,
            });
        }

        Ok(())
    }

    /// Drops every segment. The list returns to the state of a newly created one, keeping only
    /// its segment size.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.count = 0;
        self.cursor = 0;
    }

    /// Marks the tail slot as vacant, releasing a trailing segment if one was left over.
    fn retract_tail(&mut self) {
        let drained_index = self.cursor;

        let segment = self
            .segments
            .get_mut(drained_index)
            .expect("the cursor always points at an existing segment while the list is not empty");

        segment.retract();

        self.count = self
            .count
            .checked_sub(1)
            .expect("a segment had an occupied slot so the list cannot be empty");

        if !segment.is_empty() {
            return;
        }

        self.cursor = drained_index.saturating_sub(1);

        // The drained segment stays as the spare. Anything after it goes away.
        let keep = drained_index
            .checked_add(1)
            .expect("segment index cannot overflow");

        if keep < self.segments.len() {
            debug!(
                released = self.segments.len().wrapping_sub(keep),
                remaining = keep,
                "releasing spare segment"
            );

            self.segments.truncate(keep);
        }

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Checks the cursor invariants that hold between operations.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        let Some(cursor_segment) = self.segments.get(self.cursor) else {
            assert_eq!(self.count, 0, "a list without segments must be empty");
            return;
        };

        assert_eq!(
            cursor_segment.is_empty(),
            self.count == 0,
            "the cursor segment may only be empty when the whole list is"
        );

        let trailing = self.segments.len().wrapping_sub(self.cursor).wrapping_sub(1);
        assert!(
            trailing <= 1,
            "at most one spare segment may follow the cursor, found {trailing}"
        );

        if let Some(spare) = self.segments.get(self.cursor.wrapping_add(1)) {
            assert!(spare.is_empty(), "the segment after the cursor must be empty");
        }
    }
}

impl<T: Default> SegmentedList<T> {
    /// Claims a slot at the tail of the list and returns a reference to it.
    ///
    /// The slot holds `T::default()`. A new segment is allocated only if every existing segment
    /// is full. Items in other segments never move, but the returned reference borrows the list
    /// exclusively, so it cannot be held across any further operation on the list.
    ///
    /// The index of the new item is the list length before the call.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::SegmentedList;
    ///
    /// let mut list = SegmentedList::<String>::new();
    ///
    /// let slot = list.allocate_slot();
    /// assert_eq!(slot, "");
    /// slot.push_str("hello");
    ///
    /// assert_eq!(list.get(0), "hello");
    /// ```
    pub fn allocate_slot(&mut self) -> &mut T {
        let needs_new_segment = match self.segments.get(self.cursor) {
            None => true,
            Some(segment) if segment.is_full() => {
                let is_last = self.cursor.wrapping_add(1) == self.segments.len();

                self.cursor = self
                    .cursor
                    .checked_add(1)
                    .expect("segment index cannot overflow");

                is_last
            }
            Some(_) => false,
        };

        if needs_new_segment {
            debug!(
                segment_index = self.segments.len(),
                segment_size = self.geometry.size(),
                "allocating segment"
            );

            self.segments.push(Segment::new(self.geometry.size()));
        }

        self.count = self
            .count
            .checked_add(1)
            .expect("overflow here would mean the list holds more items than virtual memory can fit");

        self.segments
            .get_mut(self.cursor)
            .expect("we just ensured the cursor points at a segment with a vacant slot")
            .claim()
    }

    /// Appends `value` to the list and returns a reference to it.
    pub fn push(&mut self, value: T) -> &mut T {
        let slot = self.allocate_slot();
        *slot = value;
        slot
    }

    /// Removes the tail item and returns it, or returns `None` if the list is empty.
    ///
    /// The vacated slot is reset to `T::default()`. If this drains a segment, the list keeps
    /// that segment as a spare and releases any other empty segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::SegmentedList;
    ///
    /// let mut list = SegmentedList::<u32>::new();
    /// list.push(1);
    /// list.push(2);
    ///
    /// assert_eq!(list.remove_last(), Some(2));
    /// assert_eq!(list.remove_last(), Some(1));
    /// assert_eq!(list.remove_last(), None);
    /// ```
    pub fn remove_last(&mut self) -> Option<T> {
        let last_index = self.count.checked_sub(1)?;

        let value = mem::take(self.get_mut(last_index));
        self.retract_tail();

        Some(value)
    }

    /// Removes the item at `index` in constant time by moving the tail item into its place.
    ///
    /// This does not preserve item order: after the call, the item formerly at the tail lives
    /// at `index`. Returns the removed item.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`len()`][Self::len].
    pub fn fast_remove_at(&mut self, index: usize) -> T {
        if let Err(e) = self.check_in_range(index) {
            panic!("{e}");
        }

        let last_index = self
            .count
            .checked_sub(1)
            .expect("index is in range so the list cannot be empty");

        let tail = mem::take(self.get_mut(last_index));

        let removed = if index == last_index {
            tail
        } else {
            mem::replace(self.get_mut(index), tail)
        };

        self.retract_tail();

        removed
    }
}

impl<T> Default for SegmentedList<T> {
    fn default() -> Self {
        Self::new()
    }
}
