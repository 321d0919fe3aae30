use crate::{
    ast::{
        ArgumentKind, Keyword, NodeId, NodeKind, OperatorType, ScopeInfo, ScopeKind, Token,
        TokenType,
    },
    diagnostics::ParseErrorType,
    parser::context::ParseContext,
    text::TextRange,
};

impl ParseContext<'_> {
    /// Parses statements into `scope` until the end of input or, for braced scopes, the `}`
    /// that closes it. The `}` itself is left for the caller.
    pub(crate) fn parse_scope_statements(&mut self, scope: NodeId, braced: bool) {
        loop {
            if self.check_cancelled() {
                break;
            }
            let Some(token) = self.current() else {
                break;
            };

            match token.token_type {
                TokenType::CloseCurlyBrace if braced => break,
                TokenType::Semicolon => self.advance(),
                TokenType::CloseCurlyBrace => {
                    self.add_error(ParseErrorType::UnexpectedToken, token.range);
                    self.advance();
                }
                TokenType::CloseBrace
                | TokenType::CloseSquareBracket
                | TokenType::CloseDoubleSquareBracket
                | TokenType::Comma => {
                    self.add_error(ParseErrorType::UnexpectedToken, token.range);
                    self.recover();
                }
                _ => {
                    let errors = self.error_count();
                    let mark = self.mark();

                    let statement = self.parse_statement();
                    self.ast.append_child(scope, statement);
                    self.collect_declarations(scope, statement);
                    if self.is_cancelled() {
                        break;
                    }
                    self.finish_statement(errors);

                    if self.mark() == mark {
                        self.advance();
                    }
                }
            }
        }
    }

    /// A keyword statement, or an expression wrapped in [NodeKind::ExpressionStatement].
    pub(crate) fn parse_statement(&mut self) -> NodeId {
        match self.current_keyword() {
            Some(
                keyword @ (Keyword::If
                | Keyword::For
                | Keyword::While
                | Keyword::Repeat
                | Keyword::Break
                | Keyword::Next),
            ) => self.parse_keyword_construct(keyword),
            _ => {
                let expression = self.parse_expression();
                self.wrap(NodeKind::ExpressionStatement, expression)
            }
        }
    }

    /// A statement ends at `;`, `}`, a line break, or the end of input. Anything else is
    /// reported once and skipped up to the next recovery point.
    fn finish_statement(&mut self, errors_before: usize) {
        let Some(token) = self.current() else {
            return;
        };
        match token.token_type {
            TokenType::Semicolon => {
                self.advance();
                return;
            }
            TokenType::CloseCurlyBrace => return,
            _ if self.line_break_before_current() => return,
            _ => {}
        }

        if self.error_count() == errors_before {
            let error = if starts_term(&token) {
                ParseErrorType::OperatorExpected
            } else {
                ParseErrorType::UnexpectedToken
            };
            self.add_error(error, token.range);
        }
        self.recover();
    }

    /// Parses `if`, `for`, `while`, `repeat`, `break`, `next`, `function` and `\`. The keyword
    /// specific part comes first, then the shared body scope, then `else` for `if`.
    pub(crate) fn parse_keyword_construct(&mut self, keyword: Keyword) -> NodeId {
        self.nested(|context| context.parse_construct(keyword))
    }

    fn parse_construct(&mut self, keyword: Keyword) -> NodeId {
        let Some(kind) = construct_kind(keyword) else {
            return self.unexpected_term(ParseErrorType::ExpressionExpected);
        };
        let Some(token) = self.current() else {
            return self.error_node(ParseErrorType::ExpressionExpected, self.end_of_input());
        };

        let node = self.ast.add_node(kind, token.range, self.current_index());
        self.advance();

        if !self.parse_keyword_expression(keyword, node) {
            return node;
        }
        if !matches!(keyword, Keyword::Break | Keyword::Next) {
            let body = self.parse_body_scope();
            self.ast.append_child(node, body);
        }
        if keyword == Keyword::If {
            self.parse_else(node);
        }
        node
    }

    /// The part between the keyword and the body. False when it is malformed, in which case the
    /// construct ends there.
    fn parse_keyword_expression(&mut self, keyword: Keyword, node: NodeId) -> bool {
        match keyword {
            Keyword::If | Keyword::While => self.parse_condition(node),
            Keyword::For => self.parse_enumeration(node),
            Keyword::Function | Keyword::Lambda => self.parse_signature(node),
            _ => true,
        }
    }

    /// `( condition )`
    fn parse_condition(&mut self, node: NodeId) -> bool {
        if !self.expect_opener() {
            return false;
        }

        self.push_line_breaks(true);
        let errors = self.error_count();
        let condition = self.parse_expression();
        self.ast.append_child(node, condition);
        let closed = self.expect_closer(
            node,
            TokenType::CloseBrace,
            ParseErrorType::CloseBraceExpected,
            errors,
        );
        self.pop_line_breaks();
        closed
    }

    /// `( name in expression )`
    fn parse_enumeration(&mut self, node: NodeId) -> bool {
        if !self.expect_opener() {
            return false;
        }
        self.push_line_breaks(true);
        let parsed = self.parse_enumeration_parts(node);
        self.pop_line_breaks();
        parsed
    }

    fn parse_enumeration_parts(&mut self, node: NodeId) -> bool {
        match self.current() {
            Some(token) if token.token_type == TokenType::Identifier => {
                let name = self.variable_name(&token);
                let index = self.current_index();
                let variable = self.ast.add_node(NodeKind::Variable { name }, token.range, index);
                self.advance();
                self.ast.append_child(node, variable);
            }
            _ => {
                self.add_error(ParseErrorType::IdentifierExpected, self.current_range());
                self.skip_to_closer(TokenType::CloseBrace);
                return false;
            }
        }

        if self.current_keyword() == Some(Keyword::In) {
            self.advance();
        } else {
            self.add_error(ParseErrorType::InKeywordExpected, self.current_range());
            self.skip_to_closer(TokenType::CloseBrace);
            return false;
        }

        let errors = self.error_count();
        let sequence = self.parse_expression();
        self.ast.append_child(node, sequence);
        self.expect_closer(node, TokenType::CloseBrace, ParseErrorType::CloseBraceExpected, errors)
    }

    /// `( parameters )`. Parameters are names, `name = default`, or `...`.
    fn parse_signature(&mut self, node: NodeId) -> bool {
        if !self.current_is(TokenType::OpenBrace) {
            self.add_error(ParseErrorType::OpenBraceExpected, self.current_range());
            return false;
        }

        let (signature, closed) =
            self.parse_argument_list(TokenType::CloseBrace, ParseErrorType::CloseBraceExpected);
        self.ast.append_child(node, signature);

        let invalid: Vec<TextRange> = self.ast[signature]
            .children
            .iter()
            .filter(|&&argument| !self.is_parameter(argument))
            .map(|&argument| self.ast[argument].range)
            .collect();
        for range in invalid {
            self.add_error(ParseErrorType::IdentifierExpected, range);
        }

        closed
    }

    fn is_parameter(&self, argument: NodeId) -> bool {
        match &self.ast[argument].kind {
            NodeKind::Argument(ArgumentKind::Named | ArgumentKind::Ellipsis) => true,
            NodeKind::Argument(ArgumentKind::Positional) => self.ast[argument]
                .children
                .first()
                .and_then(|&expression| self.ast[expression].children.first())
                .is_some_and(|&value| matches!(self.ast[value].kind, NodeKind::Variable { .. })),
            _ => false,
        }
    }

    /// Consumes the `(` after a keyword or reports it missing.
    fn expect_opener(&mut self) -> bool {
        if self.current_is(TokenType::OpenBrace) {
            self.advance();
            true
        } else {
            self.add_error(ParseErrorType::OpenBraceExpected, self.current_range());
            false
        }
    }

    /// A braced scope, or a single statement in a [ScopeKind::Simple] scope.
    fn parse_body_scope(&mut self) -> NodeId {
        if self.current_is(TokenType::OpenCurlyBrace) {
            return self.parse_braced_scope();
        }

        let start = self.current_range().start;
        let scope = self.ast.add_node(
            NodeKind::Scope(ScopeInfo::new(ScopeKind::Simple)),
            TextRange::empty(start),
            None,
        );

        let statement = match self.current() {
            Some(_) if !self.is_body_end() => self.parse_statement(),
            _ => self.error_node(ParseErrorType::ExpressionExpected, self.current_range()),
        };
        self.ast.append_child(scope, statement);
        self.collect_declarations(scope, statement);
        scope
    }

    fn is_body_end(&self) -> bool {
        matches!(
            self.current_type(),
            Some(
                TokenType::Semicolon
                    | TokenType::Comma
                    | TokenType::CloseBrace
                    | TokenType::CloseSquareBracket
                    | TokenType::CloseDoubleSquareBracket
                    | TokenType::CloseCurlyBrace
            )
        )
    }

    /// `{ statements }`, starting at the `{`.
    pub(crate) fn parse_braced_scope(&mut self) -> NodeId {
        let Some(open) = self.current() else {
            return self.error_node(ParseErrorType::OpenBraceExpected, self.end_of_input());
        };
        let scope = self.ast.add_node(
            NodeKind::Scope(ScopeInfo::new(ScopeKind::Braced)),
            open.range,
            self.current_index(),
        );
        self.advance();

        self.push_line_breaks(false);
        self.braced_depth += 1;
        self.parse_scope_statements(scope, true);
        self.braced_depth -= 1;
        self.pop_line_breaks();

        match self.current() {
            Some(close) if close.token_type == TokenType::CloseCurlyBrace => {
                self.advance();
                self.ast.widen(scope, close.range);
            }
            _ if self.is_cancelled() => {}
            _ => self.add_error(ParseErrorType::CloseCurlyBraceExpected, self.end_of_input()),
        }
        scope
    }

    /// Attaches `else` and its body to `if_node`. At top level an `else` on a new line belongs
    /// to nothing, since the `if` statement already ended at the line break.
    fn parse_else(&mut self, if_node: NodeId) {
        if self.current_keyword() != Some(Keyword::Else) {
            return;
        }
        let continues = self.braced_depth > 0 || self.line_breaks_ignored();
        if self.line_break_before_current() && !continues {
            return;
        }
        let Some(token) = self.current() else {
            return;
        };

        let else_node = self.ast.add_node(NodeKind::Else, token.range, self.current_index());
        self.advance();
        let body = self.parse_body_scope();
        self.ast.append_child(else_node, body);
        self.ast.append_child(if_node, else_node);
    }

    // Declarations

    /// Records names assigned or looped over by a statement directly inside `scope`.
    fn collect_declarations(&mut self, scope: NodeId, statement: NodeId) {
        match &self.ast[statement].kind {
            NodeKind::ExpressionStatement => {
                let value = self.ast[statement]
                    .children
                    .first()
                    .and_then(|&expression| self.ast[expression].children.first())
                    .copied();
                if let Some(value) = value {
                    self.declare_assignments(scope, value);
                }
            }
            NodeKind::For => {
                if let Some(&variable) = self.ast[statement].children.first() {
                    self.declare(scope, variable, false);
                }
            }
            _ => {}
        }
    }

    /// Follows a chain like `a <- b <- function(x) x` or `1 -> a -> b`, declaring every target.
    /// Targets of a chain ending in a function definition are functions.
    fn declare_assignments(&mut self, scope: NodeId, node: NodeId) {
        let mut targets = Vec::new();
        let mut current = node;

        while let Some((op, left, right)) = self.binary_operands(current) {
            if op.is_right_assignment() {
                self.right_assignment_targets(op, right, &mut targets);
                current = left;
            } else if op.is_left_assignment() && declares(op) {
                targets.push(left);
                current = right;
            } else {
                break;
            }
        }

        let is_function = matches!(self.ast[current].kind, NodeKind::FunctionDefinition);
        for target in targets {
            self.declare(scope, target, is_function);
        }
    }

    /// `1 -> a -> b` groups as `1 -> (a -> b)`. Each target is the left operand one level down
    /// the right spine, assigned by the operator above it; the last one ends the spine.
    fn right_assignment_targets(&self, op: OperatorType, spine: NodeId, targets: &mut Vec<NodeId>) {
        let mut assigned_by = op;
        let mut current = spine;
        while let Some((op, left, right)) = self
            .binary_operands(current)
            .filter(|(op, _, _)| op.is_right_assignment())
        {
            if declares(assigned_by) {
                targets.push(left);
            }
            assigned_by = op;
            current = right;
        }
        if declares(assigned_by) {
            targets.push(current);
        }
    }

    fn binary_operands(&self, node: NodeId) -> Option<(OperatorType, NodeId, NodeId)> {
        match (&self.ast[node].kind, self.ast[node].children.as_slice()) {
            (NodeKind::Operator(info), &[left, right]) if !info.unary => {
                Some((info.op, left, right))
            }
            _ => None,
        }
    }

    fn declare(&mut self, scope: NodeId, variable: NodeId, is_function: bool) {
        let NodeKind::Variable { name } = &self.ast[variable].kind else {
            return;
        };
        let name = name.clone();
        if let NodeKind::Scope(info) = &mut self.ast.node_mut(scope).kind {
            let names = if is_function {
                &mut info.functions
            } else {
                &mut info.variables
            };
            names.entry(name).or_insert(variable);
        }
    }
}

fn construct_kind(keyword: Keyword) -> Option<NodeKind> {
    match keyword {
        Keyword::If => Some(NodeKind::If),
        Keyword::For => Some(NodeKind::For),
        Keyword::While => Some(NodeKind::While),
        Keyword::Repeat => Some(NodeKind::Repeat),
        Keyword::Break => Some(NodeKind::Break),
        Keyword::Next => Some(NodeKind::Next),
        Keyword::Function | Keyword::Lambda => Some(NodeKind::FunctionDefinition),
        Keyword::Else | Keyword::In => None,
    }
}

/// Super-assignments write to an enclosing environment, so they declare nothing here.
fn declares(op: OperatorType) -> bool {
    op.is_assignment()
        && !matches!(op, OperatorType::LeftSuperAssign | OperatorType::RightSuperAssign)
}

/// Tokens that could begin a new expression, where a missing operator is the likely mistake.
fn starts_term(token: &Token) -> bool {
    matches!(
        token.token_type,
        TokenType::Identifier
            | TokenType::Number
            | TokenType::Complex
            | TokenType::String
            | TokenType::Logical
            | TokenType::Null
            | TokenType::Missing
            | TokenType::OpenBrace
            | TokenType::OpenCurlyBrace
            | TokenType::Keyword
    )
}
