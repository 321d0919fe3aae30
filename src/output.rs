//! JSON dumps of tokens, syntax trees and diagnostics.
//!
//! Everything is first converted to a [serde_json::Value] and then printed, either compact via
//! [`to_json()`] or with 2-space indentation via [`to_json_pretty()`]. Object keys come out
//! sorted, so dumps are deterministic and diff cleanly.
//!
//! # Examples
//!
//! ```
//! use rlang_core::lexer::tokenize;
//! use rlang_core::output::{to_json, tokens_to_json};
//! use rlang_core::text::TextStream;
//!
//! let text = TextStream::new("x");
//! let json = tokens_to_json(&tokenize("x"), &text);
//! assert_eq!(to_json(&json), r#"[{"range":[0,1],"text":"x","type":"Identifier"}]"#);
//! ```

use serde_json::{Map, Value, json};

use crate::{
    ast::{AstRoot, NodeId, NodeKind, Token, TokenCollection, TokenSubType},
    diagnostics::Diagnostic,
    text::{TextProvider, TextRange},
};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        if self.pretty {
            format!("{value:#}")
        } else {
            value.to_string()
        }
    }
}

pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

fn range_to_json(range: TextRange) -> Value {
    json!([range.start, range.end])
}

pub fn token_to_json(token: &Token, text: &dyn TextProvider) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), json!(format!("{:?}", token.token_type)));
    if token.sub_type != TokenSubType::None {
        object.insert("subtype".into(), json!(format!("{:?}", token.sub_type)));
    }
    object.insert("range".into(), range_to_json(token.range));
    object.insert("text".into(), json!(text.text(token.range)));
    if let Some(anomaly) = token.anomaly {
        object.insert("anomaly".into(), json!(anomaly.message()));
    }
    Value::Object(object)
}

pub fn tokens_to_json(tokens: &TokenCollection, text: &dyn TextProvider) -> Value {
    Value::Array(tokens.iter().map(|t| token_to_json(t, text)).collect())
}

pub fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> Value {
    diagnostics
        .iter()
        .map(|d| {
            json!({
                "range": range_to_json(d.range),
                "message": d.message(),
                "severity": d.severity.to_string(),
            })
        })
        .collect()
}

/// The tree as nested objects. Children are omitted from leaves.
pub fn ast_to_json(ast: &AstRoot, text: &dyn TextProvider) -> Value {
    node_to_json(ast, ast.root(), text)
}

fn node_to_json(ast: &AstRoot, id: NodeId, text: &dyn TextProvider) -> Value {
    let node = &ast[id];
    let mut object = Map::new();
    object.insert("kind".into(), json!(node.kind.label()));
    object.insert("range".into(), range_to_json(node.range));

    match &node.kind {
        NodeKind::Variable { name } => {
            object.insert("name".into(), json!(name));
        }
        NodeKind::Constant(kind) => {
            object.insert("constant".into(), json!(format!("{kind:?}")));
            object.insert("text".into(), json!(text.text(node.range)));
        }
        NodeKind::Operator(info) => {
            object.insert("op".into(), json!(format!("{:?}", info.op)));
        }
        NodeKind::Argument(kind) => {
            object.insert("argument".into(), json!(format!("{kind:?}")));
        }
        NodeKind::Indexer { double } => {
            object.insert("double".into(), json!(double));
        }
        NodeKind::Error(error) => {
            object.insert("error".into(), json!(error.message()));
        }
        NodeKind::Scope(scope) => {
            for (key, names) in [("variables", &scope.variables), ("functions", &scope.functions)] {
                if !names.is_empty() {
                    object.insert(key.into(), json!(names.keys().collect::<Vec<_>>()));
                }
            }
        }
        _ => {}
    }

    if !node.children.is_empty() {
        let children = node
            .children
            .iter()
            .map(|&child| node_to_json(ast, child, text))
            .collect();
        object.insert("children".into(), Value::Array(children));
    }
    Value::Object(object)
}

/// Tree, diagnostics, and whether the parse was cancelled, in one document.
pub fn parse_result_to_json(ast: &AstRoot, text: &dyn TextProvider) -> Value {
    json!({
        "ast": ast_to_json(ast, text),
        "diagnostics": diagnostics_to_json(ast.diagnostics()),
        "cancelled": ast.is_cancelled(),
    })
}
