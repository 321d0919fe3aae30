//! CLI support for rlang-core
//!
//! Provides programmatic access to the `rlang` commands so other tools can embed them.

mod check;
mod convert;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, parse_to_json, tokenize_to_json};
pub use convert::{decode_hex, encode_hex, hex_to_message, message_from_json, message_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use crate::protocol::{EncodeError, MalformedData};

/// Errors that can occur during CLI operations
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot encode message: {0}")]
    Encode(#[from] EncodeError),
    #[error("Cannot decode message: {0}")]
    Malformed(#[from] MalformedData),
    /// A JSON message is missing a field or has one of the wrong type.
    #[error("Invalid message field '{0}'")]
    MessageField(&'static str),
    #[error("Invalid hex at character {0}")]
    Hex(usize),
    #[error("No input provided. Pass a file or pipe source to stdin.")]
    NoInput,
    #[error("Unknown category: '{0}'\nRun 'rlang docs' to see available categories.")]
    UnknownCategory(String),
}
