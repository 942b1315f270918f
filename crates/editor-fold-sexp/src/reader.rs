//! Reader: source text to a tagged [`Tree`].
//!
//! A single forward pass with an explicit stack of open forms, so nesting depth is bounded only
//! by memory. Every character of the source ends up in exactly one leaf.

use crate::cursor::{Cursor, Mark};
use crate::parser::SexpParserConfig;
use editor_fold_core::{Tag, Tree, TreeBuilder};

/// Collection forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coll {
    List,
    Vector,
    Map,
    Set,
    Fn,
}

impl Coll {
    fn form_tag(self) -> Tag {
        match self {
            Coll::List => Tag::LIST,
            Coll::Vector => Tag::VECTOR,
            Coll::Map => Tag::MAP,
            Coll::Set => Tag::SET,
            Coll::Fn => Tag::FN,
        }
    }

    fn glyph_tag(self) -> Tag {
        match self {
            Coll::List | Coll::Fn => Tag::PAREN,
            Coll::Vector => Tag::BRACKET,
            Coll::Map | Coll::Set => Tag::BRACE,
        }
    }

    fn closer(self) -> char {
        match self {
            Coll::List | Coll::Fn => ')',
            Coll::Vector => ']',
            Coll::Map | Coll::Set => '}',
        }
    }
}

fn closer_glyph_tag(c: char) -> Tag {
    match c {
        ']' => Tag::BRACKET,
        '}' => Tag::BRACE,
        _ => Tag::PAREN,
    }
}

fn is_whitespace(c: char, comma_is_whitespace: bool) -> bool {
    c.is_whitespace() || (c == ',' && comma_is_whitespace)
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';')
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Coll(Coll),
    /// A prefix macro waiting for the form it applies to.
    Macro,
}

struct Reader<'a> {
    cursor: Cursor<'a>,
    builder: TreeBuilder,
    frames: Vec<Frame>,
    comma_is_whitespace: bool,
    broken: bool,
}

/// Read `text` into a tree tagged with `version`.
pub(crate) fn read(text: &str, config: &SexpParserConfig, version: u64) -> Tree {
    let mut reader = Reader {
        cursor: Cursor::new(text),
        builder: TreeBuilder::new(),
        frames: Vec::new(),
        comma_is_whitespace: config.comma_is_whitespace,
        broken: false,
    };
    reader.run();

    if !reader.frames.is_empty() {
        tracing::trace!(open = reader.frames.len(), "unterminated forms at end of input");
        reader.broken = true;
    }
    let broken = reader.broken;
    reader.builder.finish(text, version, broken)
}

impl Reader<'_> {
    fn run(&mut self) {
        while !self.cursor.is_eof() {
            let start = self.cursor.mark();
            match self.cursor.advance() {
                c if is_whitespace(c, self.comma_is_whitespace) => {
                    let comma = self.comma_is_whitespace;
                    self.cursor.advance_while(|c| is_whitespace(c, comma));
                    self.leaf([Tag::WHITESPACE], start);
                }
                ';' => {
                    self.cursor.advance_while(|c| c != '\n');
                    self.leaf([Tag::COMMENT], start);
                }
                '(' => self.open(Coll::List, start),
                '[' => self.open(Coll::Vector, start),
                '{' => self.open(Coll::Map, start),
                c @ (')' | ']' | '}') => self.close(c, start),
                '"' => self.string(Tag::STRING, start),
                '\\' => self.character(start),
                ':' => {
                    self.eat_symbol();
                    self.atom(Tag::KEYWORD, start);
                }
                '\'' | '`' | '@' | '^' => self.prefix(start),
                '~' => {
                    self.cursor.eat('@');
                    self.prefix(start);
                }
                // Unquote, in dialects where commas are not whitespace.
                ',' => {
                    self.cursor.eat('@');
                    self.prefix(start);
                }
                '#' => self.dispatch(start),
                c if c.is_ascii_digit()
                    || (matches!(c, '+' | '-') && self.cursor.peek().is_ascii_digit()) =>
                {
                    self.eat_symbol();
                    self.atom(Tag::NUMBER, start);
                }
                _ => {
                    self.eat_symbol();
                    self.atom(Tag::SYMBOL, start);
                }
            }
        }
    }

    fn eat_symbol(&mut self) {
        self.cursor.advance_while(is_symbol_char);
    }

    fn leaf<const N: usize>(&mut self, tags: [Tag; N], start: Mark) {
        let text = self.cursor.text_since(start);
        self.builder.leaf(tags, start.pos, text);
    }

    /// A complete atom.
    fn atom(&mut self, tag: Tag, start: Mark) {
        self.leaf([tag], start);
        self.form_done();
    }

    /// Close the prefix macros waiting on the form that just ended.
    fn form_done(&mut self) {
        while let Some(Frame::Macro) = self.frames.last() {
            self.frames.pop();
            self.builder.finish_node(self.cursor.pos());
        }
    }

    fn open(&mut self, coll: Coll, start: Mark) {
        self.builder.start_node([coll.form_tag()], start.pos);
        self.leaf([coll.glyph_tag(), coll.form_tag()], start);
        self.frames.push(Frame::Coll(coll));
    }

    fn close(&mut self, c: char, start: Mark) {
        // Prefix macros with nothing left to apply to.
        while let Some(Frame::Macro) = self.frames.last() {
            self.frames.pop();
            self.builder.finish_node(start.pos);
            self.broken = true;
        }

        match self.frames.last() {
            Some(Frame::Coll(coll)) if coll.closer() == c => {
                let coll = *coll;
                self.leaf([coll.glyph_tag(), coll.form_tag()], start);
                self.frames.pop();
                self.builder.finish_node(self.cursor.pos());
                self.form_done();
            }
            _ => {
                tracing::trace!(offset = start.pos, closer = %c, "unmatched closing delimiter");
                self.leaf([closer_glyph_tag(c), Tag::UNMATCHED], start);
                self.broken = true;
            }
        }
    }

    fn prefix(&mut self, start: Mark) {
        self.builder.start_node([Tag::MACRO], start.pos);
        self.leaf([Tag::MACRO], start);
        self.frames.push(Frame::Macro);
    }

    /// A string or regex literal whose opening delimiter has been consumed.
    fn string(&mut self, form: Tag, start: Mark) {
        self.builder.start_node([form.clone()], start.pos);
        self.leaf([Tag::STRING_DELIMITER, form.clone()], start);

        let body = self.cursor.mark();
        let terminated = loop {
            if self.cursor.is_eof() {
                break false;
            }
            match self.cursor.peek() {
                '"' => break true,
                '\\' => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                _ => {
                    self.cursor.advance();
                }
            }
        };
        if self.cursor.pos() > body.pos {
            self.leaf([Tag::STRING_BODY], body);
        }

        if terminated {
            let close = self.cursor.mark();
            self.cursor.advance();
            self.leaf([Tag::STRING_DELIMITER, form], close);
            self.builder.finish_node(self.cursor.pos());
            self.form_done();
        } else {
            tracing::trace!(offset = start.pos, "unterminated string at end of input");
            self.builder.finish_node(self.cursor.pos());
            self.broken = true;
        }
    }

    /// A character literal: `\a`, `\(`, `\newline`, `λ`.
    fn character(&mut self, start: Mark) {
        if self.cursor.is_eof() {
            self.leaf([Tag::CHAR], start);
            self.broken = true;
            return;
        }
        if self.cursor.advance().is_alphanumeric() {
            self.cursor.advance_while(char::is_alphanumeric);
        }
        self.atom(Tag::CHAR, start);
    }

    /// Forms introduced by `#`.
    fn dispatch(&mut self, start: Mark) {
        match self.cursor.peek() {
            '{' => {
                self.cursor.advance();
                self.open(Coll::Set, start);
            }
            '(' => {
                self.cursor.advance();
                self.open(Coll::Fn, start);
            }
            '"' => {
                self.cursor.advance();
                self.string(Tag::REGEX, start);
            }
            '_' | '\'' | '=' => {
                self.cursor.advance();
                self.prefix(start);
            }
            '?' => {
                self.cursor.advance();
                self.cursor.eat('@');
                self.prefix(start);
            }
            // Symbolic values: `##Inf`, `##NaN`.
            '#' => {
                self.cursor.advance();
                self.eat_symbol();
                self.atom(Tag::SYMBOL, start);
            }
            // Tagged literals: `#inst "..."`, `#uuid "..."`.
            c if !self.cursor.is_eof() && is_symbol_char(c) => {
                self.eat_symbol();
                self.prefix(start);
            }
            _ => {
                tracing::trace!(offset = start.pos, "dangling dispatch character");
                self.atom(Tag::SYMBOL, start);
                self.broken = true;
            }
        }
    }
}
