//! The incremental parser capability.
//!
//! The core never tokenizes or parses text itself. A backend (see `editor-fold-sexp`) implements
//! [`IncrementalParser`]: it maintains an opaque buffer that absorbs edits and produces an
//! immutable [`Tree`] for a buffer on demand.

use crate::error::EditError;
use crate::tree::Tree;

/// An incremental parser backend.
///
/// Buffers are values: `edit_buffer` returns a new buffer and leaves its input untouched, so a
/// store can retry an edit against a newer buffer after losing a race.
pub trait IncrementalParser: Send + Sync {
    /// Opaque incremental buffer.
    type Buffer: Clone + Send + Sync + 'static;

    /// Build a fresh buffer holding `text`. Never fails.
    fn from_text(&self, text: &str) -> Self::Buffer;

    /// Replace `length` chars at `offset` in `buffer` with `inserted_text`.
    ///
    /// `None` stands for an empty buffer.
    fn edit_buffer(
        &self,
        buffer: Option<&Self::Buffer>,
        offset: usize,
        length: usize,
        inserted_text: &str,
    ) -> Result<Self::Buffer, EditError>;

    /// Parse `buffer` into a tree tagged with `version`.
    ///
    /// Source the parser cannot fully resolve yields a tree flagged broken, not an error.
    fn parse_tree(&self, buffer: &Self::Buffer, version: u64) -> Tree;

    /// Full text held by `buffer`.
    fn buffer_text(&self, buffer: &Self::Buffer) -> String;
}
