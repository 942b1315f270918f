//! Delimiter matching.
//!
//! A single pass over leaf tokens that pairs paren-family delimiters (`(`/`[`/`{` with
//! `)`/`]`/`}`) and string delimiters (`"`), producing one [`FoldingRange`] per matched pair.
//!
//! The scan is an explicit loop over a two-state automaton ([`ScanState`]), so arbitrarily deep
//! or long inputs never grow the call stack. Each delimiter family keeps its own pending opens:
//! strings may contain characters that look like parens and the two families interleave.
//!
//! A paren opener seen inside a string is counted against the innermost pending paren instead of
//! opening an entry of its own, so no range ever starts inside a string literal.
//!
//! Malformed input never fails the pass:
//! - a closer with no pending opener is ignored
//! - openers still pending at the end are dropped
//! - pairs that would produce an empty range are dropped

use crate::range::FoldingRange;

/// A token the matcher can inspect.
pub trait DelimiterToken {
    /// Literal text of the token.
    fn glyph(&self) -> &str;
    /// Start character offset.
    fn start_offset(&self) -> usize;
    /// End character offset (exclusive).
    fn end_offset(&self) -> usize;
}

/// How the matcher sees a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Paren-family opener: `(`, `[`, `{`, and prefixed forms such as `#(` or `#{`.
    Open,
    /// Paren-family closer: `)`, `]`, `}`.
    Close,
    /// String delimiter: `"`, and the opening `#"` of a regex.
    StringDelimiter,
}

impl Glyph {
    /// Classify a token by its text. Anything else is invisible to the matcher.
    pub fn classify(text: &str) -> Option<Self> {
        match text.chars().last()? {
            '(' | '[' | '{' => Some(Self::Open),
            ')' | ']' | '}' => Some(Self::Close),
            '"' => Some(Self::StringDelimiter),
            _ => None,
        }
    }
}

/// Matcher automaton state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Not inside an unmatched string.
    Outside,
    /// Inside a string; only string delimiters are matched.
    InsideString,
}

/// A pending opener within one delimiter family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOccurrenceEntry<T> {
    /// The opening token.
    pub opening: T,
    /// Opens this entry accounts for: the opener itself plus openers counted against it.
    pub occurrences: usize,
}

/// Pending openers of one delimiter family, innermost last.
#[derive(Debug)]
struct Pending<T> {
    entries: Vec<TokenOccurrenceEntry<T>>,
}

impl<T> Pending<T> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn open(&mut self, opening: T) {
        self.entries.push(TokenOccurrenceEntry {
            opening,
            occurrences: 1,
        });
    }

    /// Count one more open against the innermost entry, if any.
    fn count_nested(&mut self) {
        if let Some(entry) = self.entries.last_mut() {
            entry.occurrences += 1;
        }
    }

    /// Close one occurrence of the innermost entry, returning the entry once it is exhausted.
    fn close(&mut self) -> Option<TokenOccurrenceEntry<T>> {
        let entry = self.entries.last_mut()?;
        if entry.occurrences > 1 {
            entry.occurrences -= 1;
            return None;
        }
        self.entries.pop()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pair delimiters in `tokens` (source order) and return the resulting ranges.
///
/// Each range starts at the opener's end offset and ends at the closer's end offset. The result
/// is ordered by start offset, outer ranges before the inner ranges they contain.
pub fn match_delimiters<T, I>(tokens: I) -> Vec<FoldingRange>
where
    I: IntoIterator<Item = T>,
    T: DelimiterToken,
{
    let mut parens = Pending::new();
    let mut strings = Pending::new();
    let mut state = ScanState::Outside;
    let mut ranges = Vec::new();

    let mut emit = |opening: &T, closing: &T| {
        if let Some(range) = FoldingRange::between(opening.end_offset(), closing.end_offset()) {
            ranges.push(range);
        }
    };

    for token in tokens {
        let Some(glyph) = Glyph::classify(token.glyph()) else {
            continue;
        };

        state = match (state, glyph) {
            (ScanState::Outside, Glyph::Open) => {
                parens.open(token);
                ScanState::Outside
            }
            (ScanState::Outside, Glyph::Close) => {
                if let Some(entry) = parens.close() {
                    emit(&entry.opening, &token);
                }
                ScanState::Outside
            }
            (ScanState::Outside, Glyph::StringDelimiter) => {
                strings.open(token);
                ScanState::InsideString
            }
            (ScanState::InsideString, Glyph::StringDelimiter) => {
                if let Some(entry) = strings.close() {
                    emit(&entry.opening, &token);
                }
                if strings.is_empty() {
                    ScanState::Outside
                } else {
                    ScanState::InsideString
                }
            }
            (ScanState::InsideString, Glyph::Open) => {
                parens.count_nested();
                ScanState::InsideString
            }
            (ScanState::InsideString, Glyph::Close) => ScanState::InsideString,
        };
    }

    let unmatched = parens.len() + strings.len();
    if unmatched > 0 {
        tracing::trace!(unmatched, "discarding unmatched delimiters");
    }

    ranges.sort_unstable_by_key(|r| (r.start_offset, std::cmp::Reverse(r.length)));
    ranges
}
