//! Text ranges and random-access text sources.
//!
//! All positions are character offsets, not byte offsets. Editors address R buffers by
//! character, and the tokenizer walks the text one `char` at a time.

use std::fmt;

/// A half-open range `[start, end)` of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, length: usize) -> Self {
        TextRange { start, end: start + length }
    }

    pub fn from_bounds(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        TextRange { start, end: end.max(start) }
    }

    /// Zero-length range at `position`. Used for "expected X here" diagnostics.
    pub fn empty(position: usize) -> Self {
        TextRange { start: position, end: position }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    pub fn contains_range(&self, other: TextRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// True when the ranges share at least one position. An empty range intersects a range
    /// that contains its position.
    pub fn intersects(&self, other: TextRange) -> bool {
        if other.is_empty() {
            return self.contains(other.start) || other.start == self.start;
        }
        if self.is_empty() {
            return other.contains(self.start);
        }
        self.start < other.end && other.start < self.end
    }

    pub fn union(&self, other: TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

/// Random-access character source the tokenizer and parser read from.
pub trait TextProvider {
    /// Number of characters in the source.
    fn len(&self) -> usize;

    /// Character at `index`, or `'\0'` past the end of the text.
    fn char_at(&self, index: usize) -> char;

    /// Text covered by `range`, clamped to the source bounds.
    fn text(&self, range: TextRange) -> String;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory text provider over a string.
#[derive(Debug, Clone, Default)]
pub struct TextStream {
    chars: Vec<char>,
}

impl TextStream {
    pub fn new(text: &str) -> Self {
        TextStream {
            chars: text.chars().collect(),
        }
    }
}

impl TextProvider for TextStream {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, index: usize) -> char {
        self.chars.get(index).copied().unwrap_or('\0')
    }

    fn text(&self, range: TextRange) -> String {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        self.chars[start..end].iter().collect()
    }
}

impl From<&str> for TextStream {
    fn from(text: &str) -> Self {
        TextStream::new(text)
    }
}

/// True when the text in `range` contains a line break.
pub fn has_line_break(text: &dyn TextProvider, range: TextRange) -> bool {
    let end = range.end.min(text.len());
    (range.start..end).any(|i| matches!(text.char_at(i), '\n' | '\r'))
}

/// Forward-only cursor the tokenizers use to walk a sub-range of a [TextProvider].
pub struct CharacterStream<'t> {
    text: &'t dyn TextProvider,
    range: TextRange,
    position: usize,
}

impl<'t> CharacterStream<'t> {
    /// Creates a stream over `range`, clamped to the provider's length.
    pub fn new(text: &'t dyn TextProvider, range: TextRange) -> Self {
        let end = range.end.min(text.len());
        let start = range.start.min(end);
        CharacterStream {
            text,
            range: TextRange::from_bounds(start, end),
            position: start,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.position >= self.range.end
    }

    /// Current character, or `'\0'` at the end of the stream.
    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn next(&self) -> char {
        self.peek(1)
    }

    /// Character `offset` positions ahead. Never reads past the stream's range.
    pub fn peek(&self, offset: usize) -> char {
        let index = self.position + offset;
        if index < self.range.end {
            self.text.char_at(index)
        } else {
            '\0'
        }
    }

    pub fn advance(&mut self, count: usize) {
        self.position = (self.position + count).min(self.range.end);
    }

    pub fn text(&self) -> &'t dyn TextProvider {
        self.text
    }
}
