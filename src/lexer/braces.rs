//! Brace tokenizer for brace matching.
//!
//! A much smaller state machine than the R tokenizer: it only reports `()`, `[]` and `{}`,
//! stepping over strings, backtick names and comments so brackets inside them are ignored.

use crate::text::{CharacterStream, TextProvider, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BraceTokenType {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
}

impl BraceTokenType {
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            BraceTokenType::OpenBrace | BraceTokenType::OpenBracket | BraceTokenType::OpenCurly
        )
    }

    /// The other half of the pair.
    pub fn counterpart(&self) -> BraceTokenType {
        match self {
            BraceTokenType::OpenBrace => BraceTokenType::CloseBrace,
            BraceTokenType::CloseBrace => BraceTokenType::OpenBrace,
            BraceTokenType::OpenBracket => BraceTokenType::CloseBracket,
            BraceTokenType::CloseBracket => BraceTokenType::OpenBracket,
            BraceTokenType::OpenCurly => BraceTokenType::CloseCurly,
            BraceTokenType::CloseCurly => BraceTokenType::OpenCurly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceToken {
    pub token_type: BraceTokenType,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BraceTokenizer;

impl BraceTokenizer {
    pub fn new() -> Self {
        BraceTokenizer
    }

    pub fn tokenize(
        &self,
        text: &dyn TextProvider,
        start: usize,
        length: usize,
    ) -> Vec<BraceToken> {
        let range = TextRange::from_bounds(start, start.saturating_add(length));
        let mut cs = CharacterStream::new(text, range);
        let mut tokens = Vec::new();

        while !cs.is_end_of_stream() {
            let token_type = match cs.current() {
                '(' => Some(BraceTokenType::OpenBrace),
                ')' => Some(BraceTokenType::CloseBrace),
                '[' => Some(BraceTokenType::OpenBracket),
                ']' => Some(BraceTokenType::CloseBracket),
                '{' => Some(BraceTokenType::OpenCurly),
                '}' => Some(BraceTokenType::CloseCurly),
                '"' | '\'' | '`' => {
                    skip_quoted(&mut cs);
                    continue;
                }
                '#' => {
                    while !cs.is_end_of_stream() && !matches!(cs.current(), '\n' | '\r') {
                        cs.advance(1);
                    }
                    continue;
                }
                _ => None,
            };

            if let Some(token_type) = token_type {
                tokens.push(BraceToken {
                    token_type,
                    range: TextRange::new(cs.position(), 1),
                });
            }
            cs.advance(1);
        }

        tokens
    }
}

fn skip_quoted(cs: &mut CharacterStream<'_>) {
    let quote = cs.current();
    cs.advance(1);
    while !cs.is_end_of_stream() {
        match cs.current() {
            '\\' => cs.advance(2),
            c if c == quote => {
                cs.advance(1);
                return;
            }
            _ => cs.advance(1),
        }
    }
}

/// Index of the brace matching `tokens[index]`, searching forward from an opening brace and
/// backward from a closing one. Other brace kinds in between are ignored.
pub fn find_matching_brace(tokens: &[BraceToken], index: usize) -> Option<usize> {
    let token = tokens.get(index)?;
    let target = token.token_type.counterpart();
    let mut depth = 0usize;

    let mut check = |i: usize| -> Option<usize> {
        let t = tokens[i].token_type;
        if t == token.token_type {
            depth += 1;
        } else if t == target {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
        None
    };

    if token.token_type.is_open() {
        (index + 1..tokens.len()).find_map(&mut check)
    } else {
        (0..index).rev().find_map(&mut check)
    }
}
