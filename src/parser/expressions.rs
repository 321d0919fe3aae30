use crate::{
    ast::{
        ArgumentKind, Association, ConstantKind, NodeId, NodeKind, OperatorInfo,
        OperatorType, Token, TokenSubType, TokenType,
    },
    diagnostics::ParseErrorType,
    parser::context::ParseContext,
    text::TextRange,
};

impl ParseContext<'_> {
    /// Parses a complete expression and wraps it in a [NodeKind::Expression].
    pub(crate) fn parse_expression(&mut self) -> NodeId {
        let term = self.parse_binary(0, ParseErrorType::ExpressionExpected);
        self.wrap(NodeKind::Expression, term)
    }

    /// Creates a node of `kind` with the range of `child` and attaches the child.
    pub(crate) fn wrap(&mut self, kind: NodeKind, child: NodeId) -> NodeId {
        let node = self.ast.add_node(kind, self.ast[child].range, None);
        self.ast.append_child(node, child);
        node
    }

    fn parse_binary(&mut self, min_precedence: u8, missing: ParseErrorType) -> NodeId {
        self.nested(|context| context.parse_operators(min_precedence, missing))
    }

    /// Precedence climbing. Parses operators binding at least as tight as `min_precedence`,
    /// plus calls and indexers, which bind tighter than any operator.
    fn parse_operators(&mut self, min_precedence: u8, missing: ParseErrorType) -> NodeId {
        let mut left = self.parse_prefix(missing);

        while !self.is_expression_end() {
            let Some(token) = self.current() else {
                break;
            };
            match token.token_type {
                TokenType::OpenBrace => left = self.parse_call(left),
                TokenType::OpenSquareBracket => left = self.parse_indexer(left, false),
                TokenType::OpenDoubleSquareBracket => left = self.parse_indexer(left, true),
                TokenType::Operator => {
                    let text = self.token_text(&token);
                    let Some(op) = OperatorType::binary_from_str(&text) else {
                        break;
                    };
                    let precedence = op.precedence();
                    if precedence < min_precedence {
                        break;
                    }

                    let op_index = self.current_index();
                    self.advance();
                    let right = if op.takes_name_operand() {
                        self.parse_name_operand()
                    } else {
                        let next = match op.association() {
                            Association::Left => precedence + 1,
                            Association::Right => precedence,
                        };
                        self.parse_binary(next, ParseErrorType::RightOperandExpected)
                    };

                    let node = self.ast.add_node(
                        NodeKind::Operator(OperatorInfo { op, unary: false }),
                        token.range,
                        op_index,
                    );
                    self.ast.append_child(node, left);
                    self.ast.append_child(node, right);
                    left = node;
                }
                _ => break,
            }
        }

        left
    }

    /// A unary operator application or a term.
    fn parse_prefix(&mut self, missing: ParseErrorType) -> NodeId {
        let Some(token) = self.current() else {
            return self.error_node(missing, self.end_of_input());
        };

        if token.token_type == TokenType::Operator {
            let text = self.token_text(&token);
            if let Some(op) = OperatorType::unary_from_str(&text) {
                let op_index = self.current_index();
                self.advance();
                let operand =
                    self.parse_binary(op.precedence(), ParseErrorType::RightOperandExpected);
                let node = self.ast.add_node(
                    NodeKind::Operator(OperatorInfo { op, unary: true }),
                    token.range,
                    op_index,
                );
                self.ast.append_child(node, operand);
                return node;
            }
        }

        self.parse_term(missing)
    }

    fn parse_term(&mut self, missing: ParseErrorType) -> NodeId {
        let Some(token) = self.current() else {
            return self.error_node(missing, self.end_of_input());
        };
        let index = self.current_index();

        let constant = match token.token_type {
            TokenType::Number => Some(ConstantKind::Number),
            TokenType::Complex => Some(ConstantKind::Complex),
            TokenType::String => Some(ConstantKind::String),
            TokenType::Logical => Some(ConstantKind::Logical),
            TokenType::Null => Some(ConstantKind::Null),
            TokenType::Missing => Some(ConstantKind::Missing),
            _ => None,
        };
        if let Some(kind) = constant {
            self.advance();
            return self.ast.add_node(NodeKind::Constant(kind), token.range, index);
        }

        match token.token_type {
            TokenType::Identifier | TokenType::Ellipsis => {
                let name = self.variable_name(&token);
                self.advance();
                self.ast.add_node(NodeKind::Variable { name }, token.range, index)
            }
            TokenType::OpenBrace => self.parse_group(),
            TokenType::OpenCurlyBrace => self.parse_braced_scope(),
            TokenType::Keyword => match self.current_keyword() {
                Some(keyword) if keyword.starts_statement() => {
                    self.parse_keyword_construct(keyword)
                }
                _ => self.unexpected_term(missing),
            },
            _ => self.unexpected_term(missing),
        }
    }

    /// Reports a token that cannot start a term. Terminators and closers are left for the
    /// enclosing construct; anything else is consumed.
    pub(crate) fn unexpected_term(&mut self, missing: ParseErrorType) -> NodeId {
        let Some(token) = self.current() else {
            return self.error_node(missing, self.end_of_input());
        };

        let leave = matches!(
            token.token_type,
            TokenType::Semicolon
                | TokenType::Comma
                | TokenType::CloseBrace
                | TokenType::CloseSquareBracket
                | TokenType::CloseDoubleSquareBracket
                | TokenType::CloseCurlyBrace
        );
        if leave {
            return self.error_node(missing, TextRange::empty(self.previous_end()));
        }

        self.advance();
        if token.anomaly.is_some() && self.report_lexical {
            // Reported along with the other lexical anomalies.
            return self
                .ast
                .add_node(NodeKind::Error(ParseErrorType::UnexpectedToken), token.range, None);
        }
        self.error_node(ParseErrorType::UnexpectedToken, token.range)
    }

    /// Name of an identifier or string token with its quotes removed.
    pub(crate) fn variable_name(&self, token: &Token) -> String {
        let text = self.token_text(token);
        match (token.token_type, token.sub_type) {
            (_, TokenSubType::QuotedIdentifier) => unquote(&text, '`'),
            (TokenType::String, TokenSubType::None) => match text.chars().next() {
                Some(quote) => unquote(&text, quote),
                None => text,
            },
            _ => text,
        }
    }

    /// Right side of `$`, `@`, `::` and `:::`: a name or a string.
    fn parse_name_operand(&mut self) -> NodeId {
        match self.current() {
            Some(token)
                if matches!(token.token_type, TokenType::Identifier | TokenType::String) =>
            {
                let index = self.current_index();
                let name = self.variable_name(&token);
                self.advance();
                self.ast.add_node(NodeKind::Variable { name }, token.range, index)
            }
            Some(token) if !self.is_expression_end() => {
                self.error_node(ParseErrorType::IdentifierExpected, token.range)
            }
            Some(_) => self.error_node(
                ParseErrorType::IdentifierExpected,
                TextRange::empty(self.previous_end()),
            ),
            None => self.error_node(ParseErrorType::IdentifierExpected, self.end_of_input()),
        }
    }

    /// `( expression )`
    fn parse_group(&mut self) -> NodeId {
        let Some(open) = self.current() else {
            return self.error_node(ParseErrorType::ExpressionExpected, self.end_of_input());
        };
        let group = self.ast.add_node(NodeKind::Group, open.range, self.current_index());
        self.advance();

        self.push_line_breaks(true);
        let errors = self.error_count();
        let expression = self.parse_expression();
        self.ast.append_child(group, expression);
        self.expect_closer(
            group,
            TokenType::CloseBrace,
            ParseErrorType::CloseBraceExpected,
            errors,
        );
        self.pop_line_breaks();

        group
    }

    /// Consumes `closer` and widens `node` over it. Otherwise reports `error` (unless something
    /// inside the construct was already reported) and skips ahead to the closer.
    pub(crate) fn expect_closer(
        &mut self,
        node: NodeId,
        closer: TokenType,
        error: ParseErrorType,
        errors_before: usize,
    ) -> bool {
        if let Some(token) = self.current().filter(|t| t.token_type == closer) {
            self.advance();
            self.ast.widen(node, token.range);
            return true;
        }

        if self.error_count() == errors_before {
            self.add_error(error, self.current_range());
        }

        match self.skip_to_closer(closer) {
            Some(token) => {
                self.ast.widen(node, token.range);
                true
            }
            None => false,
        }
    }

    fn parse_call(&mut self, callee: NodeId) -> NodeId {
        let (arguments, _) =
            self.parse_argument_list(TokenType::CloseBrace, ParseErrorType::CloseBraceExpected);
        let call = self.wrap(NodeKind::FunctionCall, callee);
        self.ast.append_child(call, arguments);
        call
    }

    fn parse_indexer(&mut self, target: NodeId, double: bool) -> NodeId {
        let (closer, error) = if double {
            (TokenType::CloseDoubleSquareBracket, ParseErrorType::CloseDoubleSquareBracketExpected)
        } else {
            (TokenType::CloseSquareBracket, ParseErrorType::CloseSquareBracketExpected)
        };
        let (arguments, _) = self.parse_argument_list(closer, error);
        let indexer = self.wrap(NodeKind::Indexer { double }, target);
        self.ast.append_child(indexer, arguments);
        indexer
    }

    /// Parses `( ... )`, `[ ... ]` or `[[ ... ]]` starting at the opener. Empty slots become
    /// [ArgumentKind::Missing] arguments. The flag is false when the closer was never found.
    pub(crate) fn parse_argument_list(
        &mut self,
        closer: TokenType,
        error: ParseErrorType,
    ) -> (NodeId, bool) {
        let Some(open) = self.current() else {
            let node = self.error_node(ParseErrorType::OpenBraceExpected, self.end_of_input());
            return (node, false);
        };
        let list = self.ast.add_node(NodeKind::ArgumentList, open.range, self.current_index());
        self.advance();
        self.push_line_breaks(true);

        let errors = self.error_count();
        let mut expect_argument = true;
        let mut after_comma = false;
        let mut closed = false;

        loop {
            let Some(token) = self.current() else {
                self.add_error(error, self.end_of_input());
                break;
            };

            if token.token_type == closer {
                if after_comma {
                    self.missing_argument(list, token.start());
                }
                self.advance();
                self.ast.widen(list, token.range);
                closed = true;
                break;
            }

            if token.token_type == TokenType::Comma {
                if expect_argument {
                    self.missing_argument(list, token.start());
                }
                self.advance();
                self.ast.widen(list, token.range);
                expect_argument = true;
                after_comma = true;
                continue;
            }

            if !expect_argument {
                if self.error_count() == errors {
                    self.add_error(error, token.range);
                }
                if let Some(token) = self.skip_to_closer(closer) {
                    self.ast.widen(list, token.range);
                    closed = true;
                }
                break;
            }

            let argument = self.parse_argument(closer);
            self.ast.append_child(list, argument);
            expect_argument = false;
            after_comma = false;
        }

        self.pop_line_breaks();
        (list, closed)
    }

    fn missing_argument(&mut self, list: NodeId, position: usize) {
        let argument = self.ast.add_node(
            NodeKind::Argument(ArgumentKind::Missing),
            TextRange::empty(position),
            None,
        );
        self.ast.append_child(list, argument);
    }

    fn parse_argument(&mut self, closer: TokenType) -> NodeId {
        let token = self.current();
        let next = self.peek(1);
        let index = self.current_index();

        if let Some(token) = token {
            let ends_argument = |t: Option<Token>| {
                t.is_none_or(|t| t.token_type == TokenType::Comma || t.token_type == closer)
            };

            if token.token_type == TokenType::Ellipsis && ends_argument(next) {
                self.advance();
                let kind = NodeKind::Argument(ArgumentKind::Ellipsis);
                return self.ast.add_node(kind, token.range, index);
            }

            let is_name = matches!(token.token_type, TokenType::Identifier | TokenType::String);
            if is_name && next.is_some_and(|n| self.is_operator(&n, "=")) {
                let name = self.variable_name(&token);
                self.advance();
                self.advance();
                let variable = self.ast.add_node(NodeKind::Variable { name }, token.range, index);
                let argument = self.wrap(NodeKind::Argument(ArgumentKind::Named), variable);
                if !ends_argument(self.current()) {
                    let value = self.parse_expression();
                    self.ast.append_child(argument, value);
                }
                return argument;
            }
        }

        let value = self.parse_expression();
        self.wrap(NodeKind::Argument(ArgumentKind::Positional), value)
    }
}

fn unquote(text: &str, quote: char) -> String {
    let inner = text.strip_prefix(quote).unwrap_or(text);
    inner.strip_suffix(quote).unwrap_or(inner).to_string()
}
