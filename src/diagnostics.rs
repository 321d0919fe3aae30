//! Syntax and lexical diagnostics.
//!
//! The parser never fails on malformed source. Everything it objects to ends up here, attached
//! to the [AstRoot](crate::ast::AstRoot) it returns.

use std::fmt;

use crate::{ast::tokens::LexicalAnomaly, text::TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Informational,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Informational => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorType {
    /// A token that has no place where it appears.
    UnexpectedToken,
    /// Two expressions side by side with nothing joining them, `x y`.
    OperatorExpected,
    IdentifierExpected,
    ExpressionExpected,
    /// A binary operator with nothing on its right, `x <- `.
    RightOperandExpected,
    /// `(`
    OpenBraceExpected,
    /// `)`
    CloseBraceExpected,
    /// `]`
    CloseSquareBracketExpected,
    /// `]]`
    CloseDoubleSquareBracketExpected,
    /// `}`
    CloseCurlyBraceExpected,
    /// The `in` of a `for` loop.
    InKeywordExpected,
    /// Expressions or keyword constructs nested past the parser's limit. The nested part is
    /// skipped.
    NestingTooDeep,
    /// A malformed lexeme reported by the tokenizer.
    Lexical(LexicalAnomaly),
}

impl ParseErrorType {
    pub fn message(&self) -> &'static str {
        match self {
            ParseErrorType::UnexpectedToken => "Unexpected token",
            ParseErrorType::OperatorExpected => "Operator expected",
            ParseErrorType::IdentifierExpected => "Identifier expected",
            ParseErrorType::ExpressionExpected => "Expression expected",
            ParseErrorType::RightOperandExpected => "Right operand expected",
            ParseErrorType::OpenBraceExpected => "'(' expected",
            ParseErrorType::CloseBraceExpected => "')' expected",
            ParseErrorType::CloseSquareBracketExpected => "']' expected",
            ParseErrorType::CloseDoubleSquareBracketExpected => "']]' expected",
            ParseErrorType::CloseCurlyBraceExpected => "'}' expected",
            ParseErrorType::InKeywordExpected => "'in' expected",
            ParseErrorType::NestingTooDeep => "Expression nested too deeply",
            ParseErrorType::Lexical(anomaly) => anomaly.message(),
        }
    }
}

impl fmt::Display for ParseErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A problem found in the source, with the range an editor should underline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub error: ParseErrorType,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(error: ParseErrorType, range: TextRange) -> Self {
        Diagnostic {
            range,
            error,
            severity: Severity::Error,
        }
    }

    pub fn message(&self) -> &'static str {
        self.error.message()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.range, self.error)
    }
}
