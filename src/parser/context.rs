use tracing::trace;

use crate::{
    ast::{
        AstRoot, Keyword, NodeId, NodeKind, Token, TokenCollection, TokenIndex, TokenType,
    },
    diagnostics::{Diagnostic, ParseErrorType},
    parser::{CancellationToken, ParseOptions},
    text::{TextProvider, TextRange, has_line_break},
    utils::remove_duplicates,
};

/// How deep expressions and keyword constructs may nest before the rest is skipped.
pub const MAX_NESTING: usize = 100;

/// Mutable state of a single parse pass: the token cursor, the tree under construction, and the
/// diagnostics collected so far.
pub struct ParseContext<'t> {
    pub(crate) text: &'t dyn TextProvider,
    pub(crate) ast: AstRoot,
    /// Indices of the tokens the parser looks at. Comments are left out.
    significant: Vec<TokenIndex>,
    position: usize,
    diagnostics: Vec<Diagnostic>,
    /// One entry per open `(`, `[` or `{`: true when line breaks do not end expressions.
    line_breaks_ignored: Vec<bool>,
    pub(crate) braced_depth: usize,
    nesting: usize,
    /// Lexical anomalies already have diagnostics, so tokens carrying one are not reported again.
    pub(crate) report_lexical: bool,
    end: usize,
    cancel: Option<&'t dyn CancellationToken>,
    cancelled: bool,
}

impl<'t> ParseContext<'t> {
    pub fn new(
        text: &'t dyn TextProvider,
        tokens: TokenCollection,
        range: TextRange,
        options: &ParseOptions,
        cancel: Option<&'t dyn CancellationToken>,
    ) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_comment())
            .map(|(i, _)| i)
            .collect();

        let diagnostics = if options.report_lexical_anomalies {
            tokens
                .iter()
                .filter_map(|t| {
                    t.anomaly
                        .map(|a| Diagnostic::new(ParseErrorType::Lexical(a), t.range))
                })
                .collect()
        } else {
            Vec::new()
        };

        ParseContext {
            text,
            ast: AstRoot::new(tokens, range),
            significant,
            position: 0,
            diagnostics,
            line_breaks_ignored: vec![false],
            braced_depth: 0,
            nesting: 0,
            report_lexical: options.report_lexical_anomalies,
            end: range.end,
            cancel,
            cancelled: false,
        }
    }

    /// Hands over the finished tree with its diagnostics sorted by position and repeats removed.
    pub fn finish(mut self) -> AstRoot {
        let by_position = |a: &Diagnostic, b: &Diagnostic| {
            a.range.cmp(&b.range).then(a.message().cmp(b.message()))
        };
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by(by_position);
        remove_duplicates(&mut diagnostics, Some(by_position));
        self.ast.set_diagnostics(diagnostics);
        if self.cancelled {
            self.ast.set_cancelled();
        }
        self.ast
    }

    // Token cursor

    pub fn current_index(&self) -> Option<TokenIndex> {
        self.significant.get(self.position).copied()
    }

    pub fn current(&self) -> Option<Token> {
        self.peek(0)
    }

    pub fn peek(&self, offset: usize) -> Option<Token> {
        let index = *self.significant.get(self.position + offset)?;
        self.ast.tokens().get(index).copied()
    }

    pub fn current_type(&self) -> Option<TokenType> {
        self.current().map(|t| t.token_type)
    }

    pub fn current_is(&self, token_type: TokenType) -> bool {
        self.current_type() == Some(token_type)
    }

    pub fn token_text(&self, token: &Token) -> String {
        self.text.text(token.range)
    }

    pub fn current_text(&self) -> Option<String> {
        self.current().map(|t| self.token_text(&t))
    }

    pub fn current_keyword(&self) -> Option<Keyword> {
        let token = self.current().filter(|t| t.token_type == TokenType::Keyword)?;
        Keyword::from_str(&self.token_text(&token))
    }

    pub fn is_operator(&self, token: &Token, text: &str) -> bool {
        token.token_type == TokenType::Operator && self.token_text(token) == text
    }

    pub fn advance(&mut self) {
        if self.position < self.significant.len() {
            self.position += 1;
        }
    }

    pub fn is_end(&self) -> bool {
        self.position >= self.significant.len()
    }

    /// Cursor position, for detecting whether anything was consumed.
    pub fn mark(&self) -> usize {
        self.position
    }

    /// Position just after the last consumed token.
    pub fn previous_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|p| self.significant.get(p))
            .and_then(|&i| self.ast.tokens().get(i))
            .map_or(self.ast[self.ast.root()].range.start, |t| t.end())
    }

    /// Where "expected X" diagnostics go when there is no token left.
    pub fn end_of_input(&self) -> TextRange {
        TextRange::empty(self.end)
    }

    /// Range of the current token, or the end of input.
    pub fn current_range(&self) -> TextRange {
        self.current().map_or(self.end_of_input(), |t| t.range)
    }

    pub fn line_break_before_current(&self) -> bool {
        match self.current() {
            Some(token) if self.position > 0 => {
                let gap = TextRange::from_bounds(self.previous_end(), token.start());
                has_line_break(self.text, gap)
            }
            _ => false,
        }
    }

    // Line break sensitivity

    pub fn push_line_breaks(&mut self, ignored: bool) {
        self.line_breaks_ignored.push(ignored);
    }

    pub fn pop_line_breaks(&mut self) {
        self.line_breaks_ignored.pop();
    }

    pub fn line_breaks_ignored(&self) -> bool {
        self.line_breaks_ignored.last().copied().unwrap_or(false)
    }

    /// True when the current token cannot continue the expression being parsed.
    pub fn is_expression_end(&self) -> bool {
        let Some(token) = self.current() else {
            return true;
        };
        match token.token_type {
            TokenType::Semicolon
            | TokenType::Comma
            | TokenType::CloseBrace
            | TokenType::CloseSquareBracket
            | TokenType::CloseDoubleSquareBracket
            | TokenType::CloseCurlyBrace => true,
            TokenType::Keyword => {
                matches!(self.current_keyword(), Some(Keyword::Else | Keyword::In))
            }
            _ => !self.line_breaks_ignored() && self.line_break_before_current(),
        }
    }

    // Diagnostics

    pub fn add_error(&mut self, error: ParseErrorType, range: TextRange) {
        trace!(%range, ?error, "syntax error");
        self.diagnostics.push(Diagnostic::new(error, range));
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Records a diagnostic and an [NodeKind::Error] placeholder for it.
    pub fn error_node(&mut self, error: ParseErrorType, range: TextRange) -> NodeId {
        self.add_error(error, range);
        self.ast.add_node(NodeKind::Error(error), range, None)
    }

    // Nesting

    /// Runs `parse` one nesting level deeper. At [MAX_NESTING] the construct at the current
    /// token is skipped instead and replaced by a [ParseErrorType::NestingTooDeep] error node.
    pub(crate) fn nested(&mut self, parse: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        if self.nesting >= MAX_NESTING {
            let start = self.current_range().start;
            self.skip_nested();
            let range = TextRange::from_bounds(start, self.previous_end().max(start));
            return self.error_node(ParseErrorType::NestingTooDeep, range);
        }
        self.nesting += 1;
        let node = parse(self);
        self.nesting -= 1;
        node
    }

    /// Skips the rest of the expression starting at the current token, bracketed groups
    /// included. Stops at a closer or terminator of an enclosing construct.
    fn skip_nested(&mut self) {
        let mut depth = 0usize;
        let mut first = true;

        while let Some(token) = self.current() {
            if depth == 0 && !first && self.is_expression_end() {
                break;
            }
            match token.token_type {
                TokenType::OpenBrace
                | TokenType::OpenSquareBracket
                | TokenType::OpenDoubleSquareBracket
                | TokenType::OpenCurlyBrace => depth += 1,
                TokenType::CloseBrace
                | TokenType::CloseSquareBracket
                | TokenType::CloseDoubleSquareBracket
                | TokenType::CloseCurlyBrace
                | TokenType::Semicolon
                | TokenType::Comma
                    if depth == 0 =>
                {
                    break;
                }
                TokenType::CloseBrace
                | TokenType::CloseSquareBracket
                | TokenType::CloseDoubleSquareBracket
                | TokenType::CloseCurlyBrace => depth -= 1,
                _ => {}
            }
            first = false;
            self.advance();
        }

        trace!(position = self.position, "skipped nested construct");
    }

    // Cancellation

    pub fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_some_and(|c| c.is_cancelled()) {
            trace!(position = self.position, "parse cancelled");
            self.cancelled = true;
        }
        self.cancelled
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    // Recovery

    /// Skips tokens up to the next point where a statement can start: `;`, a statement keyword,
    /// an identifier or `if` that begins a line, the `}` closing the enclosing scope, or the end
    /// of input. Bracketed groups are skipped whole.
    pub fn recover(&mut self) {
        let start = self.position;
        let mut depth = 0usize;

        while let Some(token) = self.current() {
            if depth == 0 && self.is_recovery_point(&token) {
                break;
            }
            match token.token_type {
                TokenType::OpenBrace
                | TokenType::OpenSquareBracket
                | TokenType::OpenDoubleSquareBracket
                | TokenType::OpenCurlyBrace => depth += 1,
                TokenType::CloseCurlyBrace if depth == 0 => break,
                TokenType::CloseBrace
                | TokenType::CloseSquareBracket
                | TokenType::CloseDoubleSquareBracket
                | TokenType::CloseCurlyBrace => depth = depth.saturating_sub(1),
                TokenType::Semicolon if depth == 0 => break,
                _ => {}
            }
            self.advance();
        }

        trace!(skipped = self.position - start, "recovered");
    }

    fn is_recovery_point(&self, token: &Token) -> bool {
        match token.token_type {
            TokenType::Keyword => match self.current_keyword() {
                Some(Keyword::If | Keyword::Function | Keyword::Lambda) => {
                    self.line_break_before_current()
                }
                Some(keyword) => keyword.starts_statement(),
                None => false,
            },
            TokenType::Identifier => self.line_break_before_current(),
            _ => false,
        }
    }

    /// Skips to the `closer` matching an already consumed opener and consumes it. Stops without
    /// consuming at a `}` that closes an enclosing scope. Returns the closer when found.
    pub fn skip_to_closer(&mut self, closer: TokenType) -> Option<Token> {
        let mut depth = 0usize;

        while let Some(token) = self.current() {
            match token.token_type {
                t if t == closer && depth == 0 => {
                    self.advance();
                    return Some(token);
                }
                TokenType::OpenBrace
                | TokenType::OpenSquareBracket
                | TokenType::OpenDoubleSquareBracket
                | TokenType::OpenCurlyBrace => depth += 1,
                TokenType::CloseCurlyBrace if depth == 0 => return None,
                TokenType::CloseBrace
                | TokenType::CloseSquareBracket
                | TokenType::CloseDoubleSquareBracket
                | TokenType::CloseCurlyBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }

        None
    }
}
