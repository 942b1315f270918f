//! Structural tags attached to tree nodes.
//!
//! Tags are what folding descriptors select on. A delimiter leaf usually carries two of them: the
//! glyph tag (e.g. [`Tag::PAREN`]) and the tag of the form it delimits (e.g. [`Tag::LIST`]).

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A structural tag (`"paren"`, `"string-delimiter"`, `"list"`, ...).
///
/// Serialized as a plain string so persisted descriptors stay human-readable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// Opening or closing parenthesis glyph.
    pub const PAREN: Self = Self::from_static("paren");
    /// Opening or closing square bracket glyph.
    pub const BRACKET: Self = Self::from_static("bracket");
    /// Opening or closing curly brace glyph.
    pub const BRACE: Self = Self::from_static("brace");
    /// Double quote delimiting a string or regex literal.
    pub const STRING_DELIMITER: Self = Self::from_static("string-delimiter");

    /// `( ... )` form.
    pub const LIST: Self = Self::from_static("list");
    /// `[ ... ]` form.
    pub const VECTOR: Self = Self::from_static("vector");
    /// `{ ... }` form.
    pub const MAP: Self = Self::from_static("map");
    /// `#{ ... }` form.
    pub const SET: Self = Self::from_static("set");
    /// `#( ... )` anonymous function form.
    pub const FN: Self = Self::from_static("fn");
    /// `"..."` literal.
    pub const STRING: Self = Self::from_static("string");
    /// `#"..."` literal.
    pub const REGEX: Self = Self::from_static("regex");

    /// Symbol atom.
    pub const SYMBOL: Self = Self::from_static("symbol");
    /// Keyword atom.
    pub const KEYWORD: Self = Self::from_static("keyword");
    /// Numeric atom.
    pub const NUMBER: Self = Self::from_static("number");
    /// Character literal atom.
    pub const CHAR: Self = Self::from_static("char");
    /// Body text of a string or regex literal.
    pub const STRING_BODY: Self = Self::from_static("string-body");
    /// Line comment.
    pub const COMMENT: Self = Self::from_static("comment");
    /// Whitespace (including commas where configured).
    pub const WHITESPACE: Self = Self::from_static("whitespace");
    /// Reader macro prefix (`'`, `@`, `#_`, ...).
    pub const MACRO: Self = Self::from_static("macro");
    /// Document root.
    pub const ROOT: Self = Self::from_static("root");
    /// A closing delimiter without a matching opener.
    pub const UNMATCHED: Self = Self::from_static("unmatched");

    /// Create a tag from a static string.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a tag from an owned name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Tag {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
