use crate::{ArrayPool, IndexPool};

/// Operations shared by every pool in this crate, allowing code to be written once against
/// either storage strategy.
///
/// The implementations differ in how they react to misuse. [`IndexPool`] ignores a release of
/// an index it never handed out, while [`ArrayPool`] panics. Both ignore a repeated release of
/// an index that is waiting for reuse. The exception is the most recently handed out index of
/// an [`ArrayPool`]: releasing it returns it to the untouched region, after which the pool no
/// longer considers it handed out and a second release panics.
///
/// # Example
///
/// ```rust
/// use index_pool::{ArrayPool, IndexPool, Pool};
///
/// fn fill(pool: &mut impl Pool<u32>, count: u32) -> Vec<usize> {
///     (0..count)
///         .map(|value| {
///             let (index, slot) = pool.allocate();
///             *slot = value;
///             index
///         })
///         .collect()
/// }
///
/// let mut segmented = IndexPool::<u32>::new();
/// let mut contiguous = ArrayPool::<u32>::new();
///
/// let a = fill(&mut segmented, 3);
/// let b = fill(&mut contiguous, 3);
///
/// assert_eq!(*segmented.get(a[2]), 2);
/// assert_eq!(*contiguous.get(b[2]), 2);
/// ```
pub trait Pool<T> {
    /// Allocates an index and returns it together with an exclusive reference to its slot,
    /// which holds the pool's reset value.
    fn allocate(&mut self) -> (usize, &mut T);

    /// Releases `index`, resetting its slot and making the index available for reuse.
    ///
    /// # Panics
    ///
    /// [`ArrayPool`] panics if `index` is not currently handed out. See the trait docs.
    fn release(&mut self, index: usize);

    /// Gets a shared reference to the slot at `index`.
    fn get(&self, index: usize) -> &T;

    /// Gets an exclusive reference to the slot at `index`.
    fn get_mut(&mut self, index: usize) -> &mut T;

    /// Forgets every allocated index.
    fn clear(&mut self);

    /// The number of allocated indices that have not been released.
    fn len(&self) -> usize;

    /// Whether the pool has no allocated indices.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Default> Pool<T> for IndexPool<T> {
    fn allocate(&mut self) -> (usize, &mut T) {
        Self::allocate(self)
    }

    fn release(&mut self, index: usize) {
        Self::release(self, index);
    }

    fn get(&self, index: usize) -> &T {
        Self::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> &mut T {
        Self::get_mut(self, index)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn len(&self) -> usize {
        Self::len(self)
    }
}

impl<T: Clone + Default> Pool<T> for ArrayPool<T> {
    fn allocate(&mut self) -> (usize, &mut T) {
        Self::allocate(self)
    }

    fn release(&mut self, index: usize) {
        Self::release(self, index);
    }

    fn get(&self, index: usize) -> &T {
        Self::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> &mut T {
        Self::get_mut(self, index)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn len(&self) -> usize {
        Self::len(self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn exercise(pool: &mut impl Pool<String>) {
        assert!(pool.is_empty());

        let (a, slot) = pool.allocate();
        slot.push_str("a");
        let (b, slot) = pool.allocate();
        slot.push_str("b");

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(a), "a");

        pool.get_mut(b).push('!');
        assert_eq!(pool.get(b), "b!");

        pool.release(a);
        pool.release(a);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(a), "");

        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn index_pool_through_trait() {
        exercise(&mut IndexPool::new());
    }

    #[test]
    fn array_pool_through_trait() {
        exercise(&mut ArrayPool::new());
    }

    #[test]
    #[should_panic]
    fn array_pool_repeated_release_of_tail_through_trait_panics() {
        let pool: &mut dyn Pool<u32> = &mut ArrayPool::new();

        _ = pool.allocate();
        let (b, _) = pool.allocate();

        pool.release(b);
        pool.release(b);
    }
}
