#![warn(missing_docs)]
//! `editor-fold-sexp` - S-expression parser backend for `editor-fold-core`.
//!
//! This crate provides an [`IncrementalParser`](editor_fold_core::IncrementalParser) for
//! Lisp/Clojure-style source. Buffers are ropes that absorb edits cheaply; trees tag every
//! delimiter with its glyph (`paren`, `bracket`, `brace`, `string-delimiter`) and the form it
//! delimits (`list`, `vector`, `map`, `set`, `fn`, `string`, `regex`), which is what folding
//! descriptors select on.
//!
//! Malformed source never fails a parse. Stray closing delimiters are kept as leaves tagged
//! `unmatched`, unterminated forms are closed at end of input, and either marks the tree broken.

mod buffer;
mod cursor;
mod parser;
mod reader;

pub use buffer::SexpBuffer;
pub use parser::{SexpParser, SexpParserConfig};
