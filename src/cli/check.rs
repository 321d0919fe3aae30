//! Tokenize, parse and check R source

use serde_json::Value;

use super::CliError;
use crate::{
    diagnostics::{Diagnostic, Severity},
    lexer::{Tokenizer, TokenizerOptions},
    output::{parse_result_to_json, tokens_to_json},
    parser::{ParseOptions, Parser},
    text::{TextProvider, TextRange, TextStream},
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// R source to check
    pub source: Option<String>,
    /// Report lexical anomalies as well as syntax errors
    pub lexical: bool,
    /// Treat warnings as errors
    pub strict: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// No diagnostics at all
    Valid,
    /// Diagnostics, sorted by position, with whether any of them should fail the check
    Diagnostics {
        diagnostics: Vec<Diagnostic>,
        failed: bool,
    },
}

/// Parse the source and collect its diagnostics
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let source = options.source.as_deref().ok_or(CliError::NoInput)?;

    let parser = Parser::new(ParseOptions {
        report_lexical_anomalies: options.lexical,
        ..ParseOptions::default()
    });
    let text = TextStream::new(source);
    let ast = parser.parse(&text, TextRange::new(0, text.len()));

    if ast.diagnostics().is_empty() {
        return Ok(CheckResult::Valid);
    }

    let threshold = if options.strict {
        Severity::Warning
    } else {
        Severity::Error
    };
    let failed = ast.diagnostics().iter().any(|d| d.severity >= threshold);
    Ok(CheckResult::Diagnostics {
        diagnostics: ast.diagnostics().to_vec(),
        failed,
    })
}

/// Token dump of `source`
pub fn tokenize_to_json(source: &str, emit_comments: bool) -> Value {
    let text = TextStream::new(source);
    let tokens = Tokenizer::new(TokenizerOptions { emit_comments }).tokenize(&text, 0, text.len());
    tokens_to_json(&tokens, &text)
}

/// Tree and diagnostics of `source`
pub fn parse_to_json(source: &str, options: ParseOptions) -> Value {
    let text = TextStream::new(source);
    let ast = Parser::new(options).parse(&text, TextRange::new(0, text.len()));
    parse_result_to_json(&ast, &text)
}
