use std::ops::Index;

use crate::{
    ast::{
        nodes::{Node, NodeId, NodeKind, ScopeInfo, TokenIndex},
        tokens::{Token, TokenCollection},
    },
    diagnostics::Diagnostic,
    text::{TextProvider, TextRange},
};

/// A parsed R document: the node arena, the tokens it was built from, and every diagnostic
/// found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct AstRoot {
    nodes: Vec<Node>,
    root: NodeId,
    tokens: TokenCollection,
    diagnostics: Vec<Diagnostic>,
    cancelled: bool,
}

impl AstRoot {
    /// An arena holding only the global scope.
    pub(crate) fn new(tokens: TokenCollection, range: TextRange) -> Self {
        let mut tree = AstRoot {
            nodes: Vec::new(),
            root: 0,
            tokens,
            diagnostics: Vec::new(),
            cancelled: false,
        };
        tree.root = tree.add_node(
            NodeKind::Scope(ScopeInfo::new(crate::ast::ScopeKind::Global)),
            range,
            None,
        );
        tree
    }

    pub(crate) fn add_node(
        &mut self,
        kind: NodeKind,
        range: TextRange,
        token: Option<TokenIndex>,
    ) -> NodeId {
        self.nodes.push(Node {
            kind,
            range,
            token,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Attaches `child` under `parent` and widens `parent` and its ancestors to cover the
    /// child's range.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.widen(parent, self.nodes[child].range);
    }

    pub(crate) fn widen(&mut self, id: NodeId, range: TextRange) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            if node.range.contains_range(range) {
                break;
            }
            node.range = node.range.union(range);
            current = node.parent;
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub(crate) fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
    }

    pub(crate) fn set_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// The global scope node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn tokens(&self) -> &TokenCollection {
        &self.tokens
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// True when a cancellation request stopped the parse before the end of the range.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn token_at(&self, position: usize) -> Option<&Token> {
        self.tokens
            .item_containing(position)
            .and_then(|i| self.tokens.get(i))
    }

    /// The innermost node whose range contains `position`, or the root.
    pub fn node_at(&self, position: usize) -> NodeId {
        let mut current = self.root;
        'descend: loop {
            for &child in &self.nodes[current].children {
                if self.nodes[child].range.contains(position) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Nearest scope strictly above `id`.
    pub fn enclosing_scope(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(id)?.parent;
        while let Some(id) = current {
            if self.nodes[id].kind.scope().is_some() {
                return Some(id);
            }
            current = self.nodes[id].parent;
        }
        None
    }

    /// Resolves `name` starting in `scope` and moving outward through enclosing scopes.
    /// Returns the declaring [NodeKind::Variable] node.
    pub fn find_declaration(&self, name: &str, scope: NodeId) -> Option<NodeId> {
        let mut current = match self.nodes.get(scope)?.kind.scope() {
            Some(_) => Some(scope),
            None => self.enclosing_scope(scope),
        };
        while let Some(id) = current {
            if let Some(found) = self.nodes[id].kind.scope().and_then(|s| s.declaration(name)) {
                return Some(found);
            }
            current = self.enclosing_scope(id);
        }
        None
    }

    /// Source text of a node.
    pub fn text_of(&self, id: NodeId, text: &dyn TextProvider) -> String {
        text.text(self.nodes[id].range)
    }

    /// Pre-order walk of the whole tree.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![self.root],
        }
    }
}

impl Index<NodeId> for AstRoot {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

/// Read-only view of a node inside its tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a AstRoot,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.tree.nodes[self.id].kind
    }

    pub fn range(&self) -> TextRange {
        self.tree.nodes[self.id].range
    }

    pub fn token(&self) -> Option<&'a Token> {
        self.tree.nodes[self.id].token.and_then(|i| self.tree.tokens.get(i))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.nodes[self.id].parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.nodes[self.id].children.iter().map(move |&id| tree.node(id))
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.tree.nodes[self.id].children.get(index).map(|&id| self.tree.node(id))
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{} {}", self.kind().label(), self.id, self.range())
    }
}

pub struct Walk<'a> {
    tree: &'a AstRoot,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.nodes[id].children.iter().rev());
        Some(self.tree.node(id))
    }
}
