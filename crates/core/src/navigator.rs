use std::num::NonZeroUsize;

/// Bounds-checked cursor over a non-empty item list.
///
/// Moving past either end is silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemNavigator {
    index: usize,
    len: NonZeroUsize,
}

impl ItemNavigator {
    #[must_use]
    pub fn new(len: NonZeroUsize) -> Self {
        Self { index: 0, len }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len.get()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len.get()
    }

    /// Step back one item. Returns false (and does nothing) at index 0.
    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one item. Returns false (and does nothing) at the last index.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(len: usize) -> ItemNavigator {
        ItemNavigator::new(NonZeroUsize::new(len).unwrap())
    }

    #[test]
    fn prev_at_start_is_noop() {
        let mut n = nav(3);
        let before = n;
        assert!(!n.prev());
        assert_eq!(n, before);
    }

    #[test]
    fn next_stops_at_last() {
        let mut n = nav(2);
        assert!(n.next());
        assert!(n.is_last());
        let before = n;
        assert!(!n.next());
        assert_eq!(n, before);
        assert_eq!(n.index(), 1);
    }

    #[test]
    fn single_item_is_first_and_last() {
        let mut n = nav(1);
        assert!(n.is_first() && n.is_last());
        assert!(!n.next());
        assert!(!n.prev());
    }
}
