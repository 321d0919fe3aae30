//! R parser.
//!
//! Builds an [AstRoot] from a range of R source. Parsing is total: malformed input produces
//! error placeholder nodes and [Diagnostic](crate::diagnostics::Diagnostic) entries instead of
//! failing, so an editor can keep working on text that is still being typed.
//!
//! Expressions are parsed by precedence climbing over [OperatorType](crate::ast::OperatorType)
//! precedences. Statements end at `;`, a line break outside of brackets, or the `}` closing their
//! scope. After a syntax error the parser skips to the next recovery point: a `;`, a statement
//! keyword, or an identifier that begins a line. Nesting deeper than [MAX_NESTING] levels is
//! skipped and reported once.

mod context;
mod expressions;
mod statements;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::{
    ast::AstRoot,
    lexer::{Tokenizer, TokenizerOptions},
    text::{TextProvider, TextRange, TextStream},
};

pub use context::{MAX_NESTING, ParseContext};

/// Checked between statements. Once it reports true the parse stops and the partial tree is
/// returned with [AstRoot::is_cancelled] set.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

impl CancellationToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub tokenizer: TokenizerOptions,
    /// Report tokens tagged with a lexical anomaly as diagnostics.
    pub report_lexical_anomalies: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            tokenizer: TokenizerOptions::default(),
            report_lexical_anomalies: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Parser { options }
    }

    /// Parses `range` of `text`. The range is clamped to the text.
    pub fn parse(&self, text: &dyn TextProvider, range: TextRange) -> AstRoot {
        self.run(text, range, None)
    }

    pub fn parse_with_cancellation(
        &self,
        text: &dyn TextProvider,
        range: TextRange,
        cancel: &dyn CancellationToken,
    ) -> AstRoot {
        self.run(text, range, Some(cancel))
    }

    fn run(
        &self,
        text: &dyn TextProvider,
        range: TextRange,
        cancel: Option<&dyn CancellationToken>,
    ) -> AstRoot {
        let end = range.end.min(text.len());
        let range = TextRange::from_bounds(range.start.min(end), end);

        let tokens =
            Tokenizer::new(self.options.tokenizer).tokenize(text, range.start, range.len());
        let mut context = ParseContext::new(text, tokens, range, &self.options, cancel);
        let root = context.ast.root();
        context.parse_scope_statements(root, false);
        let ast = context.finish();

        debug!(
            nodes = ast.nodes().len(),
            diagnostics = ast.diagnostics().len(),
            cancelled = ast.is_cancelled(),
            "parsed"
        );
        ast
    }
}

/// Parses a whole string with default options.
pub fn parse(text: &str) -> AstRoot {
    let stream = TextStream::new(text);
    Parser::default().parse(&stream, TextRange::new(0, stream.len()))
}
