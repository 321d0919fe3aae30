use std::collections::BTreeMap;

use crate::{ast::OperatorType, diagnostics::ParseErrorType, text::TextRange};

/// Index of a node in its [AstRoot](crate::ast::AstRoot) arena.
pub type NodeId = usize;

/// Index of a token in the tree's [TokenCollection](crate::ast::TokenCollection).
pub type TokenIndex = usize;

/// One node of the syntax tree.
///
/// Nodes live in the tree's arena. Children are owned through `children`; `parent` is a plain
/// back-index.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    /// The token that introduced the node: the operator of an operator node, the keyword of a
    /// keyword construct, the name of a variable.
    pub token: Option<TokenIndex>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A statement list, braced or not, plus its declarations.
    Scope(ScopeInfo),

    // Statements
    /// Children: one [NodeKind::Expression].
    ExpressionStatement,
    /// Children: condition [NodeKind::Expression], body [NodeKind::Scope], optional
    /// [NodeKind::Else].
    If,
    /// Children: body [NodeKind::Scope].
    Else,
    /// Children: loop [NodeKind::Variable], enumerable [NodeKind::Expression], body.
    For,
    /// Children: condition, body.
    While,
    /// Children: body.
    Repeat,
    Break,
    Next,

    // Expressions
    /// A complete expression. Children: its top-level term, or nothing when missing.
    Expression,
    /// Children: one operand for unary operators, left and right for binary ones.
    Operator(OperatorInfo),
    Variable {
        name: String,
    },
    Constant(ConstantKind),
    /// Children: signature [NodeKind::ArgumentList], body [NodeKind::Scope].
    FunctionDefinition,
    /// Children: callee term, [NodeKind::ArgumentList].
    FunctionCall,
    /// `x[...]` or `x[[...]]`. Children: target term, [NodeKind::ArgumentList].
    Indexer {
        double: bool,
    },
    /// `( ... )`. Children: one [NodeKind::Expression].
    Group,
    ArgumentList,
    /// Children depend on the kind, see [ArgumentKind].
    Argument(ArgumentKind),

    /// Placeholder inserted where the parser expected something and recovered.
    Error(ParseErrorType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub op: OperatorType,
    pub unary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Number,
    Complex,
    String,
    Logical,
    Null,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// Children: one expression.
    Positional,
    /// `name = value`. Children: the name [NodeKind::Variable], then the value expression when
    /// present.
    Named,
    /// `...`
    Ellipsis,
    /// An empty slot, as in `x[, 1]`.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The whole parsed range.
    Global,
    /// `{ ... }`
    Braced,
    /// A single statement used as a body, as in `if (x) y`.
    Simple,
}

/// Scope payload. Only names assigned or defined by statements written directly in this scope
/// are recorded; nested scopes keep their own tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeInfo {
    pub kind: ScopeKind,
    /// Variable name to the declaring [NodeKind::Variable] node. First declaration wins.
    pub variables: BTreeMap<String, NodeId>,
    /// Function name to the declaring [NodeKind::Variable] node.
    pub functions: BTreeMap<String, NodeId>,
}

impl ScopeInfo {
    pub fn new(kind: ScopeKind) -> Self {
        ScopeInfo {
            kind,
            variables: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }

    pub fn is_braced(&self) -> bool {
        self.kind == ScopeKind::Braced
    }

    /// Declaration of `name` in this scope, functions first.
    pub fn declaration(&self, name: &str) -> Option<NodeId> {
        self.functions.get(name).or_else(|| self.variables.get(name)).copied()
    }
}

impl NodeKind {
    /// Short label for dumps and logs.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Scope(info) => match info.kind {
                ScopeKind::Global => "GlobalScope",
                ScopeKind::Braced => "Scope",
                ScopeKind::Simple => "SimpleScope",
            },
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::If => "If",
            NodeKind::Else => "Else",
            NodeKind::For => "For",
            NodeKind::While => "While",
            NodeKind::Repeat => "Repeat",
            NodeKind::Break => "Break",
            NodeKind::Next => "Next",
            NodeKind::Expression => "Expression",
            NodeKind::Operator(_) => "Operator",
            NodeKind::Variable { .. } => "Variable",
            NodeKind::Constant(_) => "Constant",
            NodeKind::FunctionDefinition => "FunctionDefinition",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::Indexer { .. } => "Indexer",
            NodeKind::Group => "Group",
            NodeKind::ArgumentList => "ArgumentList",
            NodeKind::Argument(_) => "Argument",
            NodeKind::Error(_) => "Error",
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::ExpressionStatement
                | NodeKind::If
                | NodeKind::For
                | NodeKind::While
                | NodeKind::Repeat
                | NodeKind::Break
                | NodeKind::Next
        )
    }

    pub fn scope(&self) -> Option<&ScopeInfo> {
        match self {
            NodeKind::Scope(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error(_))
    }
}
