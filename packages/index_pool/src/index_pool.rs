use tracing::trace;

use crate::free_list::FreeList;
use crate::{IndexPoolBuilder, Result, SegmentedList};

/// An object pool of unbounded size that hands out stable integer indices, backed by a
/// [`SegmentedList`].
///
/// [`allocate()`][1] returns an index together with an exclusive reference to the slot at that
/// index. The slot holds `T::default()`, either because it is fresh or because it was reset when
/// its previous user released it. [`release()`][2] resets the slot and makes the index available
/// for reuse by a later allocation.
///
/// Growing the pool never moves existing items, because the backing list allocates storage in
/// segments. The most recently released index is reused first.
///
/// # Lenient release
///
/// Releasing an index that the pool never handed out, or releasing the same index twice, is a
/// silent no-op. This pool favors keeping its bookkeeping consistent over reporting the misuse.
/// Compare with [`ArrayPool::release()`][3], which treats an invalid release as a bug.
///
/// # Reference validity
///
/// References returned by the pool borrow it, so the borrow checker rejects holding one across
/// a later [`allocate()`][1], [`release()`][2] or [`clear()`][4]. Keep the index instead and look
/// the item up again when needed.
///
/// # Example
///
/// ```rust
/// use index_pool::IndexPool;
///
/// let mut pool = IndexPool::<String>::new();
///
/// let (alice, slot) = pool.allocate();
/// slot.push_str("Alice");
///
/// let (bob, slot) = pool.allocate();
/// slot.push_str("Bob");
///
/// assert_eq!(pool.len(), 2);
/// assert_eq!(pool.get(alice), "Alice");
///
/// pool.release(bob);
/// assert_eq!(pool.len(), 1);
///
/// // The released index is reused and its slot was reset.
/// let (carol, slot) = pool.allocate();
/// assert_eq!(carol, bob);
/// assert_eq!(slot, "");
/// ```
///
/// [1]: Self::allocate
/// [2]: Self::release
/// [3]: crate::ArrayPool::release
/// [4]: Self::clear
#[derive(Debug)]
pub struct IndexPool<T> {
    /// Every index below `items.len()` is either live or in `free`.
    items: SegmentedList<T>,

    /// Released indices available for reuse. Releasing an index twice registers it once.
    free: FreeList,
}

impl<T> IndexPool<T> {
    #[must_use]
    pub(crate) fn new_inner(segment_size: usize) -> Self {
        Self {
            items: SegmentedList::with_segment_size(segment_size),
            free: FreeList::new(),
        }
    }

    /// Creates a new [`IndexPool`] with the default configuration.
    ///
    /// The pool starts empty and allocates its first segment on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`IndexPool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::IndexPool;
    ///
    /// let pool = IndexPool::<u64>::builder().segment_size(16).build();
    ///
    /// assert_eq!(pool.segment_size(), 16);
    /// ```
    pub fn builder() -> IndexPoolBuilder<T> {
        IndexPoolBuilder::new()
    }

    /// The number of allocated indices that have not been released.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.items
            .len()
            .checked_sub(self.free.len())
            .expect("every free index is below the item count, so there cannot be more of them")
    }

    /// Whether the pool has no allocated indices. An empty pool may still be holding capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of slots the pool can hold without allocating another segment.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// The number of slots in each segment of the backing list.
    #[must_use]
    pub fn segment_size(&self) -> usize {
        self.items.segment_size()
    }

    /// Whether `index` is currently allocated, i.e. handed out and not yet released.
    #[must_use]
    pub fn is_allocated(&self, index: usize) -> bool {
        index < self.items.len() && !self.free.contains(index)
    }

    /// Gets a shared reference to the slot at `index`.
    ///
    /// A released slot that has not been reused yet is still reachable and holds `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `index` has never been handed out by the pool.
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        self.items.get(index)
    }

    /// Gets an exclusive reference to the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` has never been handed out by the pool.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        self.items.get_mut(index)
    }

    /// Gets a shared reference to the slot at `index`, or an error if the pool has never
    /// handed out that index.
    pub fn try_get(&self, index: usize) -> Result<&T> {
        self.items.try_get(index)
    }

    /// Gets an exclusive reference to the slot at `index`, or an error if the pool has never
    /// handed out that index.
    pub fn try_get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.items.try_get_mut(index)
    }

    /// Forgets every index and drops all storage.
    ///
    /// Indices handed out before the call are no longer valid; the pool starts again from
    /// index zero.
    pub fn clear(&mut self) {
        self.free.clear();
        self.items.clear();
    }
}

impl<T: Default> IndexPool<T> {
    /// Allocates an index and returns it together with an exclusive reference to its slot.
    ///
    /// A previously released index is reused if there is one, otherwise the pool grows by one
    /// slot. Either way, the slot holds `T::default()`.
    pub fn allocate(&mut self) -> (usize, &mut T) {
        if let Some(index) = self.free.take() {
            return (index, self.items.get_mut(index));
        }

        let index = self.items.len();

        (index, self.items.allocate_slot())
    }

    /// Releases `index`, resetting its slot to `T::default()` and making the index available
    /// for reuse.
    ///
    /// Releasing an index that was never handed out, or one that is already released, does
    /// nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::IndexPool;
    ///
    /// let mut pool = IndexPool::<u32>::new();
    ///
    /// let (index, slot) = pool.allocate();
    /// *slot = 42;
    ///
    /// pool.release(index);
    /// assert_eq!(*pool.get(index), 0);
    ///
    /// // Releasing again, or releasing an unknown index, is harmless.
    /// pool.release(index);
    /// pool.release(1000);
    /// assert!(pool.is_empty());
    /// ```
    pub fn release(&mut self, index: usize) {
        if index >= self.items.len() {
            trace!(index, end = self.items.len(), "ignoring release of unknown index");
            return;
        }

        if !self.free.insert(index) {
            trace!(index, "ignoring repeated release");
            return;
        }

        *self.items.get_mut(index) = T::default();
    }
}

impl<T> Default for IndexPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::BTreeSet;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(IndexPool<u32>: Send, Sync);

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Item {
        value: usize,
    }

    #[test]
    fn smoke_test() {
        let mut pool = IndexPool::<u32>::new();

        assert_eq!(pool.len(), 0);
        assert!(pool.is_empty());

        let (a, slot) = pool.allocate();
        *slot = 42;
        let (b, slot) = pool.allocate();
        *slot = 43;
        let (c, slot) = pool.allocate();
        *slot = 44;

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(pool.len(), 3);
        assert!(pool.capacity() >= 3);

        assert_eq!(*pool.get(a), 42);
        assert_eq!(*pool.get(b), 43);
        assert_eq!(*pool.get(c), 44);

        pool.release(b);

        let (d, slot) = pool.allocate();
        *slot = 45;

        assert_eq!(d, b);
        assert_eq!(*pool.get(a), 42);
        assert_eq!(*pool.get(c), 44);
        assert_eq!(*pool.get(d), 45);
    }

    #[test]
    fn scattered_release_then_allocate_reuses() {
        let mut pool = IndexPool::<Item>::builder().segment_size(3).build();

        for expected in 0..35 {
            let (index, slot) = pool.allocate();
            assert_eq!(index, expected);
            slot.value = index;
        }

        let released = [0, 4, 34, 27, 3, 16, 11, 12, 8];
        for index in released {
            pool.release(index);
        }

        assert_eq!(pool.len(), 35 - 9);

        let (index, slot) = pool.allocate();
        assert!(released.contains(&index));
        assert_eq!(*slot, Item::default());
        slot.value = 1000;

        assert_eq!(pool.len(), 35 - 9 + 1);

        // Untouched items are still where they were.
        for index in (0..35).filter(|i| !released.contains(i)) {
            assert_eq!(pool.get(index).value, index);
        }
    }

    #[test]
    fn release_resets_to_default() {
        let mut pool = IndexPool::<String>::new();

        let (index, slot) = pool.allocate();
        slot.push_str("secret");

        pool.release(index);

        assert_eq!(pool.get(index), "");
        assert!(!pool.is_allocated(index));
    }

    #[test]
    fn double_release_is_idempotent() {
        let mut pool = IndexPool::<u32>::new();

        let (a, _) = pool.allocate();
        let (b, _) = pool.allocate();

        pool.release(a);
        pool.release(a);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.free.len(), 1);

        // Only one allocation may be satisfied from the released index.
        let (first, _) = pool.allocate();
        let (second, _) = pool.allocate();

        assert_eq!(first, a);
        assert_ne!(second, a);
        assert_ne!(second, b);
    }

    #[test]
    fn release_of_unknown_index_is_ignored() {
        let mut pool = IndexPool::<u32>::new();

        let (a, slot) = pool.allocate();
        *slot = 5;

        pool.release(1);
        pool.release(usize::MAX);

        assert_eq!(pool.len(), 1);
        assert_eq!(*pool.get(a), 5);
    }

    #[test]
    fn reallocating_after_full_release_yields_same_indices() {
        let mut pool = IndexPool::<u32>::builder().segment_size(4).build();

        let first: BTreeSet<usize> = (0..10).map(|_| pool.allocate().0).collect();

        for &index in &first {
            pool.release(index);
        }

        assert!(pool.is_empty());

        let second: BTreeSet<usize> = (0..10).map(|_| pool.allocate().0).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn large_released_batch_is_reused() {
        const COUNT: usize = 100_000;

        let mut pool = IndexPool::<usize>::new();

        for expected in 0..COUNT {
            let (index, slot) = pool.allocate();
            assert_eq!(index, expected);
            *slot = index;
        }

        for index in 0..COUNT {
            pool.release(index);
        }

        assert!(pool.is_empty());
        let capacity = pool.capacity();

        let reused: BTreeSet<usize> = (0..COUNT).map(|_| pool.allocate().0).collect();

        assert_eq!(reused.len(), COUNT);
        assert_eq!(reused.last(), Some(&(COUNT - 1)));
        assert_eq!(pool.capacity(), capacity);
        assert!(pool.free.is_empty());
    }

    #[test]
    fn is_allocated_tracks_state() {
        let mut pool = IndexPool::<u32>::new();

        assert!(!pool.is_allocated(0));

        let (index, _) = pool.allocate();
        assert!(pool.is_allocated(index));

        pool.release(index);
        assert!(!pool.is_allocated(index));
    }

    #[test]
    #[should_panic]
    fn get_never_allocated_panics() {
        let mut pool = IndexPool::<u32>::new();
        _ = pool.allocate();

        _ = pool.get(1);
    }

    #[test]
    fn try_get_reports_error() {
        let pool = IndexPool::<u32>::new();

        assert!(pool.try_get(0).is_err());
    }

    #[test]
    fn clear_resets_everything() {
        let mut pool = IndexPool::<u32>::builder().segment_size(2).build();

        for _ in 0..5 {
            _ = pool.allocate();
        }
        pool.release(1);

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 0);

        let (index, slot) = pool.allocate();
        assert_eq!(index, 0);
        assert_eq!(*slot, 0);
    }
}
