//! Folding ranges.

use crate::tree::Tree;
use std::ops::Range;

/// A contiguous source span the UI may collapse to a single display line.
///
/// Expressed as a start character offset plus a length. Ranges are produced fresh by every
/// folding computation; consumers replace their previous set wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoldingRange {
    /// Start character offset.
    pub start_offset: usize,
    /// Length in characters.
    pub length: usize,
}

impl FoldingRange {
    /// Create a range from a start offset and a length.
    pub fn new(start_offset: usize, length: usize) -> Self {
        Self {
            start_offset,
            length,
        }
    }

    /// Create a range spanning `start..end`, or `None` unless `end > start`.
    pub fn between(start: usize, end: usize) -> Option<Self> {
        (end > start).then(|| Self::new(start, end - start))
    }

    /// Exclusive end character offset.
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }

    /// Whether the range is non-empty.
    pub fn is_valid(&self) -> bool {
        self.length >= 1
    }

    /// Character range covered.
    pub fn as_range(&self) -> Range<usize> {
        self.start_offset..self.end_offset()
    }

    /// First and last line covered, as seen by `tree`.
    pub fn lines_in(&self, tree: &Tree) -> (usize, usize) {
        let last = self.end_offset().saturating_sub(1).max(self.start_offset);
        (tree.line_of(self.start_offset), tree.line_of(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    #[test]
    fn test_between_rejects_empty_and_inverted() {
        assert_eq!(FoldingRange::between(3, 3), None);
        assert_eq!(FoldingRange::between(5, 2), None);
        assert_eq!(FoldingRange::between(1, 4), Some(FoldingRange::new(1, 3)));
    }

    #[test]
    fn test_lines_in_tree() {
        let tree = TreeBuilder::new().finish("ab\ncd\nef", 0, false);
        let range = FoldingRange::between(1, 6).unwrap();
        assert_eq!(range.lines_in(&tree), (0, 1));
        assert_eq!(range.as_range(), 1..6);
    }
}
