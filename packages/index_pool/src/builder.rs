use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{ArrayPool, DEFAULT_CAPACITY, DEFAULT_SEGMENT_SIZE, IndexPool};

/// Builder for creating an instance of [`IndexPool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`IndexPool::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use index_pool::IndexPool;
///
/// let pool = IndexPool::<u32>::builder().segment_size(1000).build();
///
/// assert_eq!(pool.segment_size(), 1024);
/// ```
///
/// [1]: IndexPool::new
#[must_use]
pub struct IndexPoolBuilder<T> {
    segment_size: usize,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for IndexPoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexPoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("segment_size", &self.segment_size)
            .finish()
    }
}

impl<T> IndexPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            _item: PhantomData,
        }
    }

    /// Sets the number of items stored in each segment of the pool.
    ///
    /// The value is rounded up to the nearest power of two when the pool is built. Zero selects
    /// [`DEFAULT_SEGMENT_SIZE`].
    pub fn segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the segment size cannot be rounded up to a power of two without overflowing.
    #[must_use]
    pub fn build(self) -> IndexPool<T> {
        IndexPool::new_inner(self.segment_size)
    }
}

/// Builder for creating an instance of [`ArrayPool`].
///
/// # Examples
///
/// ```
/// use index_pool::ArrayPool;
///
/// let pool = ArrayPool::<u32>::builder().capacity(4).build();
///
/// assert_eq!(pool.capacity(), 4);
/// ```
#[must_use]
pub struct ArrayPoolBuilder<T> {
    capacity: usize,

    _item: PhantomData<T>,
}

impl<T> fmt::Debug for ArrayPoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayPoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> ArrayPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            _item: PhantomData,
        }
    }

    /// Sets the number of items the pool can hold before it first grows.
    ///
    /// The pool allocates one extra slot on top of this for its sentinel. The capacity is used
    /// as-is, it is not rounded.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the capacity plus the sentinel slot overflows `usize`.
    #[must_use]
    pub fn build(self) -> ArrayPool<T>
    where
        T: Default,
    {
        ArrayPool::new_inner(self.capacity)
    }
}
