use crate::text::TextRange;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// A character the tokenizer does not recognize. Always carries
    /// [LexicalAnomaly::UnknownCharacter].
    Unknown,

    /// `# ...` up to the end of the line.
    Comment,

    /// Variable or function name, plain or backtick-quoted.
    ///
    /// # Examples
    /// ```text
    /// x
    /// .hidden
    /// data.frame
    /// `my var`
    /// ```
    Identifier,

    /// Reserved word, see [Keyword]. The `\` lambda shorthand is also a keyword token.
    Keyword,

    /// `TRUE` or `FALSE`
    Logical,

    /// `NULL`
    Null,

    /// `NA` and its typed variants (`NA_integer_`, `NA_real_`, ...)
    Missing,

    /// Integer, double, or hexadecimal literal, plus `Inf` and `NaN`.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 1e-3
    /// 0xFFL
    /// ```
    Number,

    /// Imaginary literal with the `i` suffix, `2i`.
    Complex,

    /// Quoted or raw string literal.
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'single'
    /// r"(C:\path)"
    /// ```
    String,

    /// Any operator, including user-defined `%op%` operators.
    Operator,

    /// `(`
    OpenBrace,
    /// `)`
    CloseBrace,
    /// `[`
    OpenSquareBracket,
    /// `]`
    CloseSquareBracket,
    /// `[[`
    OpenDoubleSquareBracket,
    /// `]]`
    CloseDoubleSquareBracket,
    /// `{`
    OpenCurlyBrace,
    /// `}`
    CloseCurlyBrace,

    Comma,
    Semicolon,

    /// `...`
    Ellipsis,
}

/// Finer classification within a [TokenType].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenSubType {
    #[default]
    None,
    /// Identifier naming a built-in constant such as `pi` or `LETTERS`.
    BuiltinConstant,
    /// Identifier naming a commonly used base function such as `c` or `library`.
    BuiltinFunction,
    /// Number with the `L` suffix.
    Integer,
    /// Number written as `0x...`.
    Hexadecimal,
    /// String written as `r"(...)"`.
    RawString,
    /// Identifier written between backticks.
    QuotedIdentifier,
    Infinity,
    NaN,
}

/// A malformed lexeme. The token still spans the recognized extent; downstream consumers decide
/// whether to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalAnomaly {
    UnterminatedString,
    UnterminatedIdentifier,
    /// A `%op%` operator without its closing `%` on the same line.
    UnterminatedOperator,
    InvalidEscape,
    MalformedNumber,
    UnknownCharacter,
}

impl LexicalAnomaly {
    pub fn message(&self) -> &'static str {
        match self {
            LexicalAnomaly::UnterminatedString => "Unterminated string literal",
            LexicalAnomaly::UnterminatedIdentifier => "Unterminated quoted identifier",
            LexicalAnomaly::UnterminatedOperator => "Unterminated special operator",
            LexicalAnomaly::InvalidEscape => "Invalid escape sequence",
            LexicalAnomaly::MalformedNumber => "Malformed numeric literal",
            LexicalAnomaly::UnknownCharacter => "Unexpected character",
        }
    }
}

/// A single lexical token. Tokens do not own text; read it back through the
/// [TextProvider](crate::text::TextProvider) they were produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub sub_type: TokenSubType,
    pub range: TextRange,
    pub anomaly: Option<LexicalAnomaly>,
}

impl Token {
    pub fn new(token_type: TokenType, range: TextRange) -> Self {
        Token {
            token_type,
            sub_type: TokenSubType::None,
            range,
            anomaly: None,
        }
    }

    pub fn with_sub_type(mut self, sub_type: TokenSubType) -> Self {
        self.sub_type = sub_type;
        self
    }

    pub fn with_anomaly(mut self, anomaly: Option<LexicalAnomaly>) -> Self {
        self.anomaly = anomaly;
        self
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn is_comment(&self) -> bool {
        self.token_type == TokenType::Comment
    }
}

/// R reserved words that shape statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Else,
    Repeat,
    While,
    Function,
    /// The `\(x)` shorthand for `function(x)`.
    Lambda,
    For,
    In,
    Next,
    Break,
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Keyword> {
        match s {
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "repeat" => Some(Keyword::Repeat),
            "while" => Some(Keyword::While),
            "function" => Some(Keyword::Function),
            "\\" => Some(Keyword::Lambda),
            "for" => Some(Keyword::For),
            "in" => Some(Keyword::In),
            "next" => Some(Keyword::Next),
            "break" => Some(Keyword::Break),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Repeat => "repeat",
            Keyword::While => "while",
            Keyword::Function => "function",
            Keyword::Lambda => "\\",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Next => "next",
            Keyword::Break => "break",
        }
    }

    /// Keywords that may begin a statement. `else` and `in` only continue one.
    pub fn starts_statement(&self) -> bool {
        !matches!(self, Keyword::Else | Keyword::In)
    }
}

/// Tokens ordered by start position, mutually disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCollection {
    tokens: Vec<Token>,
}

impl TokenCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token. Callers must keep the collection sorted and disjoint.
    pub fn push(&mut self, token: Token) {
        debug_assert!(self.tokens.last().is_none_or(|last| last.end() <= token.start()));
        self.tokens.push(token);
    }

    pub(crate) fn push_mut(&mut self, token: Token) -> &mut Token {
        self.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Index of the first token whose end lies after `position`.
    fn first_ending_after(&self, position: usize) -> usize {
        self.tokens.partition_point(|t| t.end() <= position)
    }

    /// Index of the token whose range contains `position`.
    pub fn item_containing(&self, position: usize) -> Option<usize> {
        let index = self.first_ending_after(position);
        self.tokens
            .get(index)
            .filter(|t| t.range.contains(position))
            .map(|_| index)
    }

    /// Index of the first token starting at or after `position`.
    pub fn first_item_at_or_after(&self, position: usize) -> Option<usize> {
        let index = self.tokens.partition_point(|t| t.start() < position);
        (index < self.tokens.len()).then_some(index)
    }

    /// Tokens that share at least one position with `range`.
    pub fn items_overlapping(&self, range: TextRange) -> &[Token] {
        let first = self.first_ending_after(range.start);
        let mut last = first;
        while last < self.tokens.len() && self.tokens[last].range.intersects(range) {
            last += 1;
        }
        &self.tokens[first..last]
    }
}

impl<'a> IntoIterator for &'a TokenCollection {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenCollection {
    fn from(tokens: Vec<Token>) -> Self {
        let mut collection = TokenCollection::new();
        for token in tokens {
            collection.push(token);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> TokenCollection {
        // x <- f(1)
        vec![
            Token::new(TokenType::Identifier, TextRange::new(0, 1)),
            Token::new(TokenType::Operator, TextRange::new(2, 2)),
            Token::new(TokenType::Identifier, TextRange::new(5, 1)),
            Token::new(TokenType::OpenBrace, TextRange::new(6, 1)),
            Token::new(TokenType::Number, TextRange::new(7, 1)),
            Token::new(TokenType::CloseBrace, TextRange::new(8, 1)),
        ]
        .into()
    }

    #[test]
    fn test_item_containing() {
        let tokens = collection();
        assert_eq!(tokens.item_containing(0), Some(0));
        assert_eq!(tokens.item_containing(1), None);
        assert_eq!(tokens.item_containing(3), Some(1));
        assert_eq!(tokens.item_containing(8), Some(5));
        assert_eq!(tokens.item_containing(9), None);
    }

    #[test]
    fn test_items_overlapping() {
        let tokens = collection();
        let items = tokens.items_overlapping(TextRange::from_bounds(3, 7));
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].token_type, TokenType::Operator);
        assert_eq!(items[2].token_type, TokenType::OpenBrace);
        assert!(tokens.items_overlapping(TextRange::from_bounds(20, 30)).is_empty());
    }

    #[test]
    fn test_first_item_at_or_after() {
        let tokens = collection();
        assert_eq!(tokens.first_item_at_or_after(1), Some(1));
        assert_eq!(tokens.first_item_at_or_after(5), Some(2));
        assert_eq!(tokens.first_item_at_or_after(9), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        for kw in ["if", "else", "repeat", "while", "function", "for", "in", "next", "break"] {
            assert_eq!(Keyword::from_str(kw).map(|k| k.as_str()), Some(kw));
        }
        assert_eq!(Keyword::from_str("return"), None);
    }
}
