use std::str::Chars;

pub(crate) const EOF_CHAR: char = '\0';

/// Position inside the source, in both units the reader needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    /// Character offset.
    pub(crate) pos: usize,
    byte: usize,
}

/// Character cursor over s-expression source.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    chars: Chars<'a>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars(),
            pos: 0,
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            byte: self.text.len() - self.chars.as_str().len(),
        }
    }

    /// Source consumed since `mark`.
    pub(crate) fn text_since(&self, mark: Mark) -> &'a str {
        let end = self.text.len() - self.chars.as_str().len();
        &self.text[mark.byte..end]
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn advance(&mut self) -> char {
        match self.chars.next() {
            Some(c) => {
                self.pos += 1;
                c
            }
            None => EOF_CHAR,
        }
    }

    /// Advance past the next char if it is `c`.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if !self.is_eof() && self.peek() == c {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }
}
