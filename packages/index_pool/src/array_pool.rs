use std::any::type_name;
use std::iter;

use tracing::{debug, trace};

use crate::free_list::FreeList;
use crate::{ArrayPoolBuilder, Error, Result};

/// Capacity used when the caller does not ask for a specific one.
pub const DEFAULT_CAPACITY: usize = 128;

/// Below this array length the pool doubles when it grows; at or above it, growth tapers off
/// towards +25% per step.
const GROWTH_THRESHOLD: usize = 256;

/// An object pool that hands out stable integer indices into a single contiguous array.
///
/// Index 0 is a sentinel: it is never handed out and always holds `T::default()`, which is
/// the value released slots are reset to. Valid indices therefore start at 1.
///
/// When the array is full and no released index is available, the pool grows by moving every
/// item into a larger array. This makes growth cost proportional to the pool size, which
/// [`IndexPool`][1] avoids by allocating in segments. In exchange, lookups are a plain array
/// access.
///
/// # Strict release
///
/// Releasing the sentinel index or an index at or beyond [`next_unused()`][2] is a bug in the
/// caller and [`release()`][3] panics. Use [`try_release()`][4] to get an [`Error`] instead.
/// Releasing an index that is already waiting for reuse is harmless. Releasing the most recently
/// handed out index gives it straight back to the untouched region, which lowers
/// [`next_unused()`][2] past it, so releasing that index a second time panics.
///
/// # Reference validity
///
/// Any allocation may move every item in the pool, so references returned by the pool borrow
/// it and the borrow checker rejects holding one across a later mutating call.
///
/// # Example
///
/// ```rust
/// use index_pool::ArrayPool;
///
/// let mut pool = ArrayPool::<u64>::with_capacity(4);
///
/// let (first, slot) = pool.allocate();
/// *slot = 10;
/// let second = pool.allocate_index();
/// *pool.get_mut(second) = 20;
///
/// assert_eq!(first, 1);
/// assert_eq!(second, 2);
/// assert_eq!(*pool.get(first), 10);
///
/// pool.release(first);
/// assert_eq!(*pool.get(first), 0);
/// assert_eq!(pool.len(), 1);
/// ```
///
/// [1]: crate::IndexPool
/// [2]: Self::next_unused
/// [3]: Self::release
/// [4]: Self::try_release
#[derive(Debug)]
pub struct ArrayPool<T> {
    /// The backing array. `slots[0]` is the sentinel.
    slots: Vec<T>,

    /// Lowest index that has never been handed out (or has been reclaimed since). Every index in
    /// `1..next_unused` is either live or in `free`; every slot from here on holds the default.
    next_unused: usize,

    /// Released indices below `next_unused` available for reuse.
    free: FreeList,
}

impl<T> ArrayPool<T> {
    /// Starts building a new [`ArrayPool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    pub fn builder() -> ArrayPoolBuilder<T> {
        ArrayPoolBuilder::new()
    }

    /// The number of allocated indices that have not been released.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.next_unused
            .checked_sub(1)
            .and_then(|handed_out| handed_out.checked_sub(self.free.len()))
            .expect("every free index lies between the sentinel and the next unused index")
    }

    /// Whether the pool has no allocated indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of items the pool can hold before it has to grow, not counting the sentinel.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots
            .len()
            .checked_sub(1)
            .expect("the sentinel slot always exists")
    }

    /// The lowest index the pool has not handed out. Indices from here on are untouched.
    #[must_use]
    pub fn next_unused(&self) -> usize {
        self.next_unused
    }

    /// Whether `id` is currently allocated, i.e. handed out and not yet released.
    #[must_use]
    pub fn is_allocated(&self, id: usize) -> bool {
        id > 0 && id < self.next_unused && !self.free.contains(id)
    }

    /// Gets a shared reference to the slot at `id`.
    ///
    /// This is the fast path: the only check is the bounds check of the backing array, so an
    /// index that was released or never handed out returns the default value in its slot.
    ///
    /// # Panics
    ///
    /// Panics if `id` is beyond the backing array.
    #[must_use]
    pub fn get(&self, id: usize) -> &T {
        self.slots.get(id).unwrap_or_else(|| self.panic_beyond_array(id))
    }

    /// Gets an exclusive reference to the slot at `id`.
    ///
    /// Writing to the sentinel slot through this changes the value released slots are reset to.
    ///
    /// # Panics
    ///
    /// Panics if `id` is beyond the backing array.
    #[must_use]
    pub fn get_mut(&mut self, id: usize) -> &mut T {
        let len = self.slots.len();

        self.slots.get_mut(id).unwrap_or_else(|| {
            panic!(
                "index {id} is beyond the backing array of {len} slots in pool of {}",
                type_name::<T>()
            )
        })
    }

    /// Gets a shared reference to the slot at `id` without any bounds check.
    ///
    /// # Safety
    ///
    /// `id` must be less than `capacity() + 1`.
    #[must_use]
    pub unsafe fn get_unchecked(&self, id: usize) -> &T {
        // SAFETY: Forwarding the caller's guarantee that the index is within the array.
        unsafe { self.slots.get_unchecked(id) }
    }

    /// Gets an exclusive reference to the slot at `id` without any bounds check.
    ///
    /// # Safety
    ///
    /// `id` must be less than `capacity() + 1`.
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, id: usize) -> &mut T {
        // SAFETY: Forwarding the caller's guarantee that the index is within the array.
        unsafe { self.slots.get_unchecked_mut(id) }
    }

    /// Gets a shared reference to the slot at `id`, or an error if `id` is the sentinel or has
    /// never been handed out.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::ArrayPool;
    ///
    /// let mut pool = ArrayPool::<u32>::new();
    /// let id = pool.allocate_index();
    ///
    /// assert!(pool.try_get(id).is_ok());
    /// assert!(pool.try_get(0).is_err());
    /// assert!(pool.try_get(id + 1).is_err());
    /// ```
    pub fn try_get(&self, id: usize) -> Result<&T> {
        self.check_handed_out(id)?;

        Ok(self.get(id))
    }

    /// Gets an exclusive reference to the slot at `id`, or an error if `id` is the sentinel or
    /// has never been handed out.
    pub fn try_get_mut(&mut self, id: usize) -> Result<&mut T> {
        self.check_handed_out(id)?;

        Ok(self.get_mut(id))
    }

    fn check_handed_out(&self, id: usize) -> Result<()> {
        if id == 0 || id >= self.next_unused {
            return Err(Error::IndexOutOfRange {
                index: id,
                end: self.next_unused,
            });
        }

        Ok(())
    }

    fn panic_beyond_array(&self, id: usize) -> ! {
        panic!(
            "index {id} is beyond the backing array of {} slots in pool of {}",
            self.slots.len(),
            type_name::<T>()
        )
    }
}

impl<T: Default> ArrayPool<T> {
    /// # Panics
    ///
    /// Panics if the capacity plus the sentinel slot overflows `usize`.
    #[must_use]
    pub(crate) fn new_inner(capacity: usize) -> Self {
        let len = capacity
            .checked_add(1)
            .expect("capacity plus the sentinel slot must fit in usize");

        Self {
            slots: iter::repeat_with(T::default).take(len).collect(),
            next_unused: 1,
            free: FreeList::new(),
        }
    }

    /// Creates a new [`ArrayPool`] with room for [`DEFAULT_CAPACITY`] items.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new [`ArrayPool`] with room for `capacity` items before it first grows.
    ///
    /// # Panics
    ///
    /// Panics if the capacity plus the sentinel slot overflows `usize`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().capacity(capacity).build()
    }

    /// Allocates an index, growing the backing array if there is no room.
    ///
    /// Untouched slots are handed out first. Once the array is exhausted, the most recently
    /// released index is reused, and only if there are none does the pool grow. The
    /// returned index is always at least 1.
    pub fn allocate_index(&mut self) -> usize {
        loop {
            if self.next_unused < self.slots.len() {
                let id = self.next_unused;
                self.next_unused = id.checked_add(1).expect("guarded by array length above");
                return id;
            }

            if let Some(id) = self.free.take() {
                return id;
            }

            self.grow();
        }
    }

    /// Allocates an index and returns it together with an exclusive reference to its slot.
    ///
    /// The slot holds the sentinel value, `T::default()` unless the caller has changed it.
    pub fn allocate(&mut self) -> (usize, &mut T) {
        let id = self.allocate_index();

        (id, self.get_mut(id))
    }

    fn grow(&mut self) {
        let old_len = self.slots.len();
        let new_len = next_capacity(old_len);

        debug!(
            old_len,
            new_len,
            item_type = type_name::<T>(),
            "growing array pool"
        );

        self.slots.reserve_exact(new_len.wrapping_sub(old_len));
        self.slots.resize_with(new_len, T::default);
    }
}

impl<T: Clone + Default> ArrayPool<T> {
    /// Releases `id`, resetting its slot to the sentinel value and making the index available
    /// for reuse.
    ///
    /// Releasing the most recently handed out index gives it back to the untouched region
    /// instead of registering it for reuse. Releasing an index that is registered for reuse
    /// does nothing, but releasing an index that went back to the untouched region is out of
    /// range and panics.
    ///
    /// # Panics
    ///
    /// Panics if `id` is 0 or is not less than [`next_unused()`][Self::next_unused].
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::ArrayPool;
    ///
    /// let mut pool = ArrayPool::<u32>::new();
    ///
    /// let a = pool.allocate_index();
    /// let b = pool.allocate_index();
    ///
    /// // The most recent index goes straight back to the untouched region.
    /// pool.release(b);
    /// assert_eq!(pool.next_unused(), b);
    ///
    /// pool.release(a);
    /// assert!(pool.is_empty());
    /// ```
    pub fn release(&mut self, id: usize) {
        if let Err(e) = self.try_release(id) {
            panic!("{e}");
        }
    }

    /// Releases `id` like [`release()`][Self::release] but returns an error instead of
    /// panicking if `id` is not a valid index.
    ///
    /// # Example
    ///
    /// ```rust
    /// use index_pool::{ArrayPool, Error};
    ///
    /// let mut pool = ArrayPool::<u32>::new();
    ///
    /// assert_eq!(
    ///     pool.try_release(0),
    ///     Err(Error::InvalidRelease {
    ///         index: 0,
    ///         next_unused: 1
    ///     })
    /// );
    /// ```
    pub fn try_release(&mut self, id: usize) -> Result<()> {
        if id == 0 || id >= self.next_unused {
            return Err(Error::InvalidRelease {
                index: id,
                next_unused: self.next_unused,
            });
        }

        // Checked before the tail shortcut, otherwise a released index that later became the
        // tail could be handed out both from the free set and from the untouched region.
        if self.free.contains(id) {
            trace!(id, "ignoring repeated release");
            return Ok(());
        }

        self.reset_slot(id);

        let tail = self
            .next_unused
            .checked_sub(1)
            .expect("next_unused is always at least 1");

        if id == tail {
            self.next_unused = tail;
        } else {
            self.free.insert(id);
        }

        Ok(())
    }

    /// Forgets every index, resetting every handed out slot to the sentinel value.
    ///
    /// The backing array keeps its capacity.
    pub fn clear(&mut self) {
        let (sentinel, rest) = self
            .slots
            .split_first_mut()
            .expect("the sentinel slot always exists");

        let handed_out = self.next_unused.wrapping_sub(1);

        for slot in rest.iter_mut().take(handed_out) {
            slot.clone_from(sentinel);
        }

        self.next_unused = 1;
        self.free.clear();
    }

    fn reset_slot(&mut self, id: usize) {
        let (sentinel, rest) = self
            .slots
            .split_first_mut()
            .expect("the sentinel slot always exists");

        rest.get_mut(id.wrapping_sub(1))
            .expect("caller verified the index is below next_unused")
            .clone_from(sentinel);
    }
}

impl<T: Default> Default for ArrayPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The backing array length to grow to from `old_len`.
///
/// Doubles small arrays; once the array reaches [`GROWTH_THRESHOLD`], each step adds a quarter
/// of the current length plus a constant, smoothly approaching +25%.
#[must_use]
fn next_capacity(old_len: usize) -> usize {
    let increment = if old_len < GROWTH_THRESHOLD {
        old_len
    } else {
        old_len
            .checked_add(GROWTH_THRESHOLD.wrapping_mul(3))
            .expect("array pool cannot grow beyond the range of virtual memory")
            >> 2
    };

    old_len
        .checked_add(increment.max(1))
        .expect("array pool cannot grow beyond the range of virtual memory")
}
