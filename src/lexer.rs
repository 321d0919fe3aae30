//! R tokenizer.
//!
//! Turns a range of R source into a [TokenCollection]. Tokenizing never fails: a malformed
//! lexeme still becomes a token covering what was recognized, tagged with a
//! [LexicalAnomaly] for the parser or an editor to report.

pub mod braces;
mod builtins;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    ast::tokens::{Keyword, LexicalAnomaly, Token, TokenCollection, TokenSubType, TokenType},
    text::{CharacterStream, TextProvider, TextRange, TextStream},
};

pub use braces::{BraceToken, BraceTokenType, BraceTokenizer};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0[xX][0-9a-fA-F]+|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)[Li]?$")
        .expect("number pattern compiles")
});

const OPERATORS: &[&str] = &[
    // Longest first
    "<<-", "->>", ":::", "<-", "->", "<=", ">=", "==", "!=", "&&", "||", "|>", "::", ":=", "**",
    "+", "-", "*", "/", "^", "<", ">", "!", "&", "|", "~", "?", ":", "=", "$", "@",
];

/// Tokenizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Emit `#` comments as [TokenType::Comment] tokens instead of dropping them.
    pub emit_comments: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        TokenizerOptions { emit_comments: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    options: TokenizerOptions,
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Tokenizer { options }
    }

    /// Tokenizes `length` characters of `text` starting at `start`. Token ranges are absolute
    /// positions in `text`, so a sub-range can be re-tokenized after an edit and spliced back.
    pub fn tokenize(
        &self,
        text: &dyn TextProvider,
        start: usize,
        length: usize,
    ) -> TokenCollection {
        let range = TextRange::from_bounds(start, start.saturating_add(length));
        let mut lexer = Lexer {
            cs: CharacterStream::new(text, range),
            tokens: TokenCollection::new(),
            brackets: Vec::new(),
            options: self.options,
        };

        while !lexer.cs.is_end_of_stream() {
            lexer.next_token();
        }

        debug!(tokens = lexer.tokens.len(), range = %range, "tokenized");
        lexer.tokens
    }
}

/// Tokenizes a whole string with default options.
pub fn tokenize(text: &str) -> TokenCollection {
    let stream = TextStream::new(text);
    Tokenizer::default().tokenize(&stream, 0, stream.len())
}

struct Lexer<'t> {
    cs: CharacterStream<'t>,
    tokens: TokenCollection,
    /// Open `[` and `[[` brackets, used to split `]]` correctly in `x[y[1]]`.
    brackets: Vec<TokenType>,
    options: TokenizerOptions,
}

impl Lexer<'_> {
    fn add(&mut self, token_type: TokenType, start: usize) -> &mut Token {
        let range = TextRange::from_bounds(start, self.cs.position());
        self.tokens.push_mut(Token::new(token_type, range))
    }

    fn add_single(&mut self, token_type: TokenType) {
        let start = self.cs.position();
        self.cs.advance(1);
        self.add(token_type, start);
    }

    fn next_token(&mut self) {
        let ch = self.cs.current();
        let start = self.cs.position();

        match ch {
            c if c.is_whitespace() => self.cs.advance(1),
            '#' => self.read_comment(),
            '"' | '\'' => self.read_string(),
            '`' => self.read_quoted_identifier(),
            'r' | 'R' if self.is_raw_string_start() => self.read_raw_string(),
            c if c.is_ascii_digit() => self.read_number(),
            '.' if self.cs.next().is_ascii_digit() => self.read_number(),
            '.' if self.is_ellipsis() => {
                self.cs.advance(3);
                self.add(TokenType::Ellipsis, start);
            }
            c if c.is_alphabetic() || c == '.' || c == '_' => self.read_identifier(),
            '(' => self.add_single(TokenType::OpenBrace),
            ')' => self.add_single(TokenType::CloseBrace),
            '{' => self.add_single(TokenType::OpenCurlyBrace),
            '}' => self.add_single(TokenType::CloseCurlyBrace),
            ',' => self.add_single(TokenType::Comma),
            ';' => self.add_single(TokenType::Semicolon),
            '[' => self.read_open_bracket(),
            ']' => self.read_close_bracket(),
            '%' => self.read_special_operator(),
            '\\' => {
                self.cs.advance(1);
                self.add(TokenType::Keyword, start);
            }
            _ => {
                if !self.read_operator() {
                    self.cs.advance(1);
                    self.add(TokenType::Unknown, start).anomaly =
                        Some(LexicalAnomaly::UnknownCharacter);
                }
            }
        }
    }

    fn read_comment(&mut self) {
        let start = self.cs.position();
        while !self.cs.is_end_of_stream() && !matches!(self.cs.current(), '\n' | '\r') {
            self.cs.advance(1);
        }
        if self.options.emit_comments {
            self.add(TokenType::Comment, start);
        }
    }

    fn read_open_bracket(&mut self) {
        if self.cs.next() == '[' {
            let start = self.cs.position();
            self.cs.advance(2);
            self.add(TokenType::OpenDoubleSquareBracket, start);
            self.brackets.push(TokenType::OpenDoubleSquareBracket);
        } else {
            self.add_single(TokenType::OpenSquareBracket);
            self.brackets.push(TokenType::OpenSquareBracket);
        }
    }

    fn read_close_bracket(&mut self) {
        let start = self.cs.position();
        match self.brackets.pop() {
            Some(TokenType::OpenDoubleSquareBracket) if self.cs.next() == ']' => {
                self.cs.advance(2);
                self.add(TokenType::CloseDoubleSquareBracket, start);
            }
            _ => self.add_single(TokenType::CloseSquareBracket),
        }
    }

    /// `%op%` up to the next `%` on the same line. A lone `%` is tagged unterminated.
    fn read_special_operator(&mut self) {
        let start = self.cs.position();
        let mut offset = 1;
        loop {
            match self.cs.peek(offset) {
                '%' => {
                    self.cs.advance(offset + 1);
                    self.add(TokenType::Operator, start);
                    return;
                }
                '\0' | '\n' | '\r' => break,
                _ => offset += 1,
            }
        }
        self.cs.advance(1);
        self.add(TokenType::Operator, start).anomaly = Some(LexicalAnomaly::UnterminatedOperator);
    }

    fn read_operator(&mut self) -> bool {
        let start = self.cs.position();
        for op in OPERATORS {
            if op.chars().enumerate().all(|(i, c)| self.cs.peek(i) == c) {
                self.cs.advance(op.chars().count());
                self.add(TokenType::Operator, start);
                return true;
            }
        }
        false
    }

    fn read_identifier(&mut self) {
        let start = self.cs.position();
        while is_identifier_char(self.cs.current()) {
            self.cs.advance(1);
        }

        let name = self.cs.text().text(TextRange::from_bounds(start, self.cs.position()));
        let (token_type, sub_type) = classify_identifier(&name);
        self.add(token_type, start).sub_type = sub_type;
    }

    fn read_quoted_identifier(&mut self) {
        let start = self.cs.position();
        let terminated = self.skip_quoted('`');
        let token = self.add(TokenType::Identifier, start);
        token.sub_type = TokenSubType::QuotedIdentifier;
        if !terminated {
            token.anomaly = Some(LexicalAnomaly::UnterminatedIdentifier);
        }
    }

    /// Skips a backtick name. Returns false when the text ends first.
    fn skip_quoted(&mut self, quote: char) -> bool {
        self.cs.advance(1);
        while !self.cs.is_end_of_stream() {
            match self.cs.current() {
                '\\' => self.cs.advance(2),
                c if c == quote => {
                    self.cs.advance(1);
                    return true;
                }
                _ => self.cs.advance(1),
            }
        }
        false
    }

    fn read_string(&mut self) {
        let start = self.cs.position();
        let quote = self.cs.current();
        let mut anomaly = None;
        self.cs.advance(1);

        loop {
            if self.cs.is_end_of_stream() {
                anomaly = Some(LexicalAnomaly::UnterminatedString);
                break;
            }
            match self.cs.current() {
                c if c == quote => {
                    self.cs.advance(1);
                    break;
                }
                '\\' => {
                    self.cs.advance(1);
                    if !self.read_escape() && anomaly.is_none() {
                        anomaly = Some(LexicalAnomaly::InvalidEscape);
                    }
                }
                _ => self.cs.advance(1),
            }
        }

        self.add(TokenType::String, start).anomaly = anomaly;
    }

    /// Consumes the escape after a backslash. Returns false for an invalid escape.
    fn read_escape(&mut self) -> bool {
        let ch = self.cs.current();
        if self.cs.is_end_of_stream() {
            // The unterminated string is reported instead.
            return true;
        }
        self.cs.advance(1);
        match ch {
            'n' | 't' | 'r' | 'a' | 'b' | 'f' | 'v' | '\\' | '"' | '\'' | '`' | ' ' | '\n' => true,
            '0'..='7' => {
                self.skip_while_max(2, |c| ('0'..='7').contains(&c));
                true
            }
            'x' => self.skip_while_max(2, |c| c.is_ascii_hexdigit()) > 0,
            'u' | 'U' => {
                let max = if ch == 'u' { 4 } else { 8 };
                if self.cs.current() == '{' {
                    self.cs.advance(1);
                    let digits = self.skip_while_max(max, |c| c.is_ascii_hexdigit());
                    if self.cs.current() != '}' {
                        return false;
                    }
                    self.cs.advance(1);
                    digits > 0
                } else {
                    self.skip_while_max(max, |c| c.is_ascii_hexdigit()) > 0
                }
            }
            _ => false,
        }
    }

    fn skip_while_max(&mut self, max: usize, f: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while count < max && !self.cs.is_end_of_stream() && f(self.cs.current()) {
            self.cs.advance(1);
            count += 1;
        }
        count
    }

    /// `...` not followed by more of a name, which would make it an identifier like `...x`.
    fn is_ellipsis(&self) -> bool {
        self.cs.next() == '.' && self.cs.peek(2) == '.' && !is_identifier_char(self.cs.peek(3))
    }

    /// `r"(`, `R'[`, `r"---{` and so on.
    fn is_raw_string_start(&self) -> bool {
        if !matches!(self.cs.next(), '"' | '\'') {
            return false;
        }
        let mut offset = 2;
        while self.cs.peek(offset) == '-' {
            offset += 1;
        }
        matches!(self.cs.peek(offset), '(' | '[' | '{')
    }

    fn read_raw_string(&mut self) {
        let start = self.cs.position();
        let quote = self.cs.next();
        self.cs.advance(2);

        let mut dashes = 0;
        while self.cs.current() == '-' {
            dashes += 1;
            self.cs.advance(1);
        }
        let close = match self.cs.current() {
            '(' => ')',
            '[' => ']',
            _ => '}',
        };
        self.cs.advance(1);

        let mut terminated = false;
        while !self.cs.is_end_of_stream() {
            if self.cs.current() == close
                && (1..=dashes).all(|i| self.cs.peek(i) == '-')
                && self.cs.peek(dashes + 1) == quote
            {
                self.cs.advance(dashes + 2);
                terminated = true;
                break;
            }
            self.cs.advance(1);
        }

        let token = self.add(TokenType::String, start);
        token.sub_type = TokenSubType::RawString;
        if !terminated {
            token.anomaly = Some(LexicalAnomaly::UnterminatedString);
        }
    }

    fn read_number(&mut self) {
        let start = self.cs.position();
        let hex = self.cs.current() == '0' && matches!(self.cs.next(), 'x' | 'X');

        if hex {
            self.cs.advance(2);
        } else {
            self.skip_digits();
            if self.cs.current() == '.' {
                self.cs.advance(1);
                self.skip_digits();
            }
            if matches!(self.cs.current(), 'e' | 'E') {
                let sign = usize::from(matches!(self.cs.next(), '+' | '-'));
                if self.cs.peek(1 + sign).is_ascii_digit() {
                    self.cs.advance(1 + sign);
                    self.skip_digits();
                }
            }
        }

        // Suffixes, and whatever else is glued on, belong to the literal.
        while is_identifier_char(self.cs.current()) {
            self.cs.advance(1);
        }

        let text = self.cs.text().text(TextRange::from_bounds(start, self.cs.position()));
        let valid = NUMBER.is_match(&text);
        let token_type = if valid && text.ends_with('i') {
            TokenType::Complex
        } else {
            TokenType::Number
        };
        let sub_type = if !valid {
            TokenSubType::None
        } else if text.ends_with('L') {
            TokenSubType::Integer
        } else if hex {
            TokenSubType::Hexadecimal
        } else {
            TokenSubType::None
        };

        let token = self.add(token_type, start);
        token.sub_type = sub_type;
        if !valid {
            token.anomaly = Some(LexicalAnomaly::MalformedNumber);
        }
    }

    fn skip_digits(&mut self) {
        while self.cs.current().is_ascii_digit() {
            self.cs.advance(1);
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == '_'
}

fn classify_identifier(name: &str) -> (TokenType, TokenSubType) {
    if Keyword::from_str(name).is_some() {
        return (TokenType::Keyword, TokenSubType::None);
    }
    match name {
        "TRUE" | "FALSE" => (TokenType::Logical, TokenSubType::None),
        "NULL" => (TokenType::Null, TokenSubType::None),
        "NA" | "NA_integer_" | "NA_real_" | "NA_character_" | "NA_complex_" => {
            (TokenType::Missing, TokenSubType::None)
        }
        "Inf" => (TokenType::Number, TokenSubType::Infinity),
        "NaN" => (TokenType::Number, TokenSubType::NaN),
        _ => (TokenType::Identifier, builtins::classify(name)),
    }
}

#[test]
fn test_assignment() {
    let tokens = tokenize("x <- 1L");
    let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(types, vec![TokenType::Identifier, TokenType::Operator, TokenType::Number]);
    assert_eq!(tokens.get(2).map(|t| t.sub_type), Some(TokenSubType::Integer));
}

#[test]
fn test_double_brackets_split_on_nesting() {
    let tokens = tokenize("x[[y[1]]]");
    let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(
        types,
        vec![
            TokenType::Identifier,
            TokenType::OpenDoubleSquareBracket,
            TokenType::Identifier,
            TokenType::OpenSquareBracket,
            TokenType::Number,
            TokenType::CloseSquareBracket,
            TokenType::CloseDoubleSquareBracket,
        ]
    );
}
