pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod protocol;
pub mod text;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{AstRoot, NodeId, NodeKind, Token, TokenCollection, TokenType};
pub use diagnostics::{Diagnostic, ParseErrorType, Severity};
pub use lexer::{BraceTokenizer, Tokenizer, TokenizerOptions, tokenize};
pub use output::{to_json, to_json_pretty};
pub use parser::{CancellationToken, ParseOptions, Parser, parse};
pub use protocol::{EncodeError, MalformedData, Message};
pub use text::{TextProvider, TextRange, TextStream};
