//! Text edit records.
//!
//! A [`TextEdit`] describes one replacement in **character offsets** (Unicode scalar values),
//! the same unit used by buffers and trees in this crate.

/// Replace `length` characters at `offset` with `inserted_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Start character offset of the edit.
    pub offset: usize,
    /// Number of characters removed (may be zero).
    pub length: usize,
    /// Replacement text (may be empty).
    pub inserted_text: String,
}

impl TextEdit {
    /// Create an edit.
    pub fn new(offset: usize, length: usize, inserted_text: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            inserted_text: inserted_text.into(),
        }
    }

    /// An edit replacing the whole of a document that currently has `char_count` characters.
    pub fn replace_all(char_count: usize, inserted_text: impl Into<String>) -> Self {
        Self::new(0, char_count, inserted_text)
    }

    /// Exclusive end character offset in the pre-edit document.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Whether applying the edit to `before` yields exactly `after`.
    ///
    /// Compares in place, without building the edited text.
    pub fn transforms(&self, before: &str, after: &str) -> bool {
        let (Some(start), Some(end)) = (
            char_to_byte(before, self.offset),
            char_to_byte(before, self.end()),
        ) else {
            return false;
        };
        let (prefix, suffix) = (&before[..start], &before[end..]);

        after.len() == prefix.len() + self.inserted_text.len() + suffix.len()
            && after.starts_with(prefix)
            && after[prefix.len()..].starts_with(self.inserted_text.as_str())
            && after.ends_with(suffix)
    }

    /// Apply the edit to `text`, returning `None` when the range is out of bounds.
    pub fn apply_to(&self, text: &str) -> Option<String> {
        let start = char_to_byte(text, self.offset)?;
        let end = char_to_byte(text, self.end())?;

        let mut out = String::with_capacity(text.len() - (end - start) + self.inserted_text.len());
        out.push_str(&text[..start]);
        out.push_str(&self.inserted_text);
        out.push_str(&text[end..]);
        Some(out)
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(char_offset)
}
