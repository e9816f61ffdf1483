use foldhash::{HashSet, HashSetExt};

/// Released indices waiting to be handed out again.
///
/// The set answers membership queries so a repeated release is detected, and the stack gives
/// constant-time access to some released index. Both always hold the same indices.
#[derive(Debug)]
pub(crate) struct FreeList {
    members: HashSet<usize>,
    stack: Vec<usize>,
}

impl FreeList {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            members: HashSet::new(),
            stack: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[must_use]
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Registers `index` as free. Returns `false` if it was already registered.
    pub(crate) fn insert(&mut self, index: usize) -> bool {
        if !self.members.insert(index) {
            return false;
        }

        self.stack.push(index);
        true
    }

    /// Removes and returns the most recently registered index, if any.
    pub(crate) fn take(&mut self) -> Option<usize> {
        let index = self.stack.pop()?;

        let was_member = self.members.remove(&index);
        debug_assert!(was_member, "free stack and free set must hold the same indices");

        Some(index)
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
        self.stack.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn smoke_test() {
        let mut free = FreeList::new();

        assert!(free.is_empty());

        assert!(free.insert(3));
        assert!(free.insert(7));
        assert!(!free.insert(3));

        assert_eq!(free.len(), 2);
        assert!(free.contains(3));

        assert_eq!(free.take(), Some(7));
        assert_eq!(free.take(), Some(3));
        assert_eq!(free.take(), None);

        assert!(!free.contains(3));
        assert!(free.is_empty());
    }

    #[test]
    fn reinsert_after_take() {
        let mut free = FreeList::new();

        assert!(free.insert(1));
        assert_eq!(free.take(), Some(1));
        assert!(free.insert(1));
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut free = FreeList::new();

        free.insert(1);
        free.insert(2);
        free.clear();

        assert!(free.is_empty());
        assert!(!free.contains(1));
        assert!(free.insert(1));
    }

    #[test]
    fn large_batch_drains_completely() {
        let mut free = FreeList::new();

        for index in 0..100_000 {
            assert!(free.insert(index));
        }

        let mut drained = 0_usize;
        while free.take().is_some() {
            drained = drained.checked_add(1).unwrap();
        }

        assert_eq!(drained, 100_000);
        assert!(free.is_empty());
    }
}
