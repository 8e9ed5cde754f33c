//! Auto-rotating index for banners, carousels, and sale strips.

use std::time::Duration;

/// Hero banner auto-rotation period.
pub const HERO_BANNER_INTERVAL: Duration = Duration::from_secs(5);

/// Product carousel auto-rotation period.
pub const PRODUCT_CAROUSEL_INTERVAL: Duration = Duration::from_secs(4);

/// Sale strip auto-rotation period.
pub const SALE_STRIP_INTERVAL: Duration = Duration::from_secs(5);

/// Position within a collection of `len` items.
///
/// Invariant: `index < len` whenever `len > 0`, and `index == 0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rotation {
    index: usize,
    len: usize,
}

impl Rotation {
    /// Start at the first item.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Resume at `index`, clamping back to 0 when it is out of range.
    #[must_use]
    pub const fn at(index: usize, len: usize) -> Self {
        let index = if index < len { index } else { 0 };
        Self { index, len }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a timer should be driving this rotation at all.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.len > 1
    }

    /// Index the next tick would move to.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            (self.index + 1) % self.len
        }
    }

    /// Move to the next item, wrapping at the end. Returns the new index.
    pub const fn advance(&mut self) -> usize {
        self.index = self.next_index();
        self.index
    }

    /// Jump to a specific item (dot navigation). Out-of-range targets are ignored.
    pub const fn select(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// Follow the collection to a new length, clamping to 0 if the current
    /// index fell off the end.
    pub const fn resize(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_banners_advance_then_wrap() {
        let mut rotation = Rotation::new(2);
        assert_eq!(rotation.index(), 0);
        assert_eq!(rotation.advance(), 1);
        assert_eq!(rotation.advance(), 0);
    }

    #[test]
    fn test_advances_by_exactly_one_mod_len() {
        for len in 2..12 {
            let mut rotation = Rotation::new(len);
            for step in 1..(len * 3) {
                let before = rotation.index();
                let after = rotation.advance();
                assert_eq!(after, (before + 1) % len, "len {len} step {step}");
            }
        }
    }

    #[test]
    fn test_single_or_empty_collection_does_not_run() {
        let mut single = Rotation::new(1);
        assert!(!single.is_running());
        assert_eq!(single.advance(), 0);

        let mut empty = Rotation::new(0);
        assert!(!empty.is_running());
        assert!(empty.is_empty());
        assert_eq!(empty.advance(), 0);
    }

    #[test]
    fn test_shrinking_past_index_clamps_to_zero() {
        let mut rotation = Rotation::at(2, 3);
        rotation.resize(2);
        assert_eq!(rotation.index(), 0);

        let mut rotation = Rotation::at(1, 3);
        rotation.resize(2);
        assert_eq!(rotation.index(), 1);
    }

    #[test]
    fn test_at_clamps_out_of_range() {
        assert_eq!(Rotation::at(5, 3).index(), 0);
        assert_eq!(Rotation::at(2, 3).index(), 2);
    }

    #[test]
    fn test_select_ignores_out_of_range() {
        let mut rotation = Rotation::new(3);
        rotation.select(2);
        assert_eq!(rotation.index(), 2);
        rotation.select(3);
        assert_eq!(rotation.index(), 2);
    }
}
