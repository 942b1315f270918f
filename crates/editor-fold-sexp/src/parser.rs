use crate::buffer::SexpBuffer;
use crate::reader;
use editor_fold_core::{EditError, IncrementalParser, Tree};

/// Configuration for [`SexpParser`].
#[derive(Debug, Clone)]
pub struct SexpParserConfig {
    /// Read `,` as whitespace (Clojure). When `false`, `,` and `,@` are unquote prefixes
    /// (Scheme, Common Lisp).
    pub comma_is_whitespace: bool,
}

impl SexpParserConfig {
    /// Create a config for Clojure-style source.
    ///
    /// By default:
    /// - `comma_is_whitespace` is `true`
    pub fn new() -> Self {
        Self {
            comma_is_whitespace: true,
        }
    }

    /// Set whether `,` is whitespace.
    pub fn with_comma_as_whitespace(mut self, enabled: bool) -> Self {
        self.comma_is_whitespace = enabled;
        self
    }
}

impl Default for SexpParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An [`IncrementalParser`] for s-expression source.
///
/// Edits are absorbed by the rope buffer; every parse reads the whole buffer into a fresh tree.
#[derive(Debug, Clone, Default)]
pub struct SexpParser {
    config: SexpParserConfig,
}

impl SexpParser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with an explicit configuration.
    pub fn with_config(config: SexpParserConfig) -> Self {
        Self { config }
    }

    /// Parser configuration.
    pub fn config(&self) -> &SexpParserConfig {
        &self.config
    }

    /// Read `text` into a tree without going through a buffer.
    pub fn parse_str(&self, text: &str, version: u64) -> Tree {
        reader::read(text, &self.config, version)
    }
}

impl IncrementalParser for SexpParser {
    type Buffer = SexpBuffer;

    fn from_text(&self, text: &str) -> SexpBuffer {
        SexpBuffer::from_text(text)
    }

    fn edit_buffer(
        &self,
        buffer: Option<&SexpBuffer>,
        offset: usize,
        length: usize,
        inserted_text: &str,
    ) -> Result<SexpBuffer, EditError> {
        match buffer {
            Some(buffer) => buffer.edited(offset, length, inserted_text),
            None => SexpBuffer::default().edited(offset, length, inserted_text),
        }
    }

    fn parse_tree(&self, buffer: &SexpBuffer, version: u64) -> Tree {
        let text = buffer.to_string();
        let tree = reader::read(&text, &self.config, version);
        tracing::debug!(
            version,
            chars = tree.char_count(),
            nodes = tree.node_count(),
            broken = tree.is_broken(),
            "parsed s-expression buffer"
        );
        tree
    }

    fn buffer_text(&self, buffer: &SexpBuffer) -> String {
        buffer.to_string()
    }
}
