//! # R Syntax Tree
//!
//! Token model and the arena-backed syntax tree the parser produces.
//!
//! ## Layout
//!
//! - **[tokens]** - Tokens, token types, and the sorted [TokenCollection]
//! - **[operators]** - R operators with precedence and associativity
//! - **[nodes]** - The closed set of node kinds and their payloads
//! - **[tree]** - [AstRoot], the arena owning all nodes, plus position and name queries
//!
//! ## Ownership
//!
//! Nodes are stored in a single `Vec` owned by [AstRoot] and addressed by [NodeId]. A node
//! owns its children through their ids; its `parent` is a non-owning back-index. A node's range
//! always covers the ranges of all its children.
//!
//! ## Example
//!
//! ```
//! use rlang_core::ast::NodeKind;
//! use rlang_core::parser::parse;
//!
//! let ast = parse("f <- function(x) x + 1\ny <- f(2)");
//! assert!(ast.diagnostics().is_empty());
//!
//! let global = ast.node(ast.root());
//! let scope = global.kind().scope().unwrap();
//! assert!(scope.functions.contains_key("f"));
//! assert!(scope.variables.contains_key("y"));
//! assert!(matches!(global.child(0).unwrap().kind(), NodeKind::ExpressionStatement));
//! ```
pub mod nodes;
pub mod operators;
pub mod tokens;
pub mod tree;

pub use nodes::{
    ArgumentKind, ConstantKind, Node, NodeId, NodeKind, OperatorInfo, ScopeInfo, ScopeKind,
    TokenIndex,
};
pub use operators::{Association, OperatorType};
pub use tokens::{Keyword, LexicalAnomaly, Token, TokenCollection, TokenSubType, TokenType};
pub use tree::{AstRoot, NodeRef};
