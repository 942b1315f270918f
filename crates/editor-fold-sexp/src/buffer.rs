use editor_fold_core::EditError;
use ropey::Rope;
use std::fmt;

/// Source buffer of the s-expression parser.
///
/// Backed by a [`Rope`]: edits cost `O(log n)` and cloning shares structure, so a store can keep
/// the buffer of every committed state around cheaply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SexpBuffer {
    rope: Rope,
}

impl SexpBuffer {
    /// Create a buffer holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Return a copy with `length` chars at `offset` replaced by `inserted_text`.
    pub fn edited(
        &self,
        offset: usize,
        length: usize,
        inserted_text: &str,
    ) -> Result<Self, EditError> {
        let len = self.len_chars();
        let end = offset.checked_add(length).filter(|end| *end <= len).ok_or(
            EditError::OutOfBounds {
                offset,
                end: offset.saturating_add(length),
                len,
            },
        )?;

        let mut rope = self.rope.clone();
        if end > offset {
            rope.remove(offset..end);
        }
        if !inserted_text.is_empty() {
            rope.insert(offset, inserted_text);
        }
        Ok(Self { rope })
    }
}

impl fmt::Display for SexpBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_replaces_chars() {
        let buffer = SexpBuffer::from_text("(λ x)");
        let edited = buffer.edited(1, 1, "fn").unwrap();
        assert_eq!(edited.to_string(), "(fn x)");
        assert_eq!(buffer.to_string(), "(λ x)");
        assert_eq!(edited.len_chars(), 6);
    }

    #[test]
    fn test_edit_at_end_and_empty() {
        let buffer = SexpBuffer::default();
        assert!(buffer.is_empty());
        let buffer = buffer.edited(0, 0, "(a\n b)").unwrap();
        assert_eq!(buffer.len_chars(), 6);
        let buffer = buffer.edited(6, 0, "\n").unwrap();
        assert_eq!(buffer.to_string(), "(a\n b)\n");
    }

    #[test]
    fn test_out_of_bounds_edit_fails() {
        let buffer = SexpBuffer::from_text("abc");
        assert_eq!(
            buffer.edited(2, 5, ""),
            Err(EditError::OutOfBounds {
                offset: 2,
                end: 7,
                len: 3
            })
        );
        assert!(buffer.edited(usize::MAX, 1, "").is_err());
    }
}
