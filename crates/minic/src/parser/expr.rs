//! Recursive descent parser: the expression ladder
//!
//! One function per precedence level, lowest first. Binary levels parse the
//! next level up and fold left while the current token is one of the level's
//! operators. Assignment and the conditional recurse on the right instead.

use crate::ast::{Node, NodeKind};
use crate::lexer::TokenKind;

use super::parser::Parser;

type Level<'a> = fn(&mut Parser<'a>) -> Option<Node>;

impl<'a> Parser<'a> {
    /// `assignment_expression (',' assignment_expression)*`
    pub(super) fn parse_expression(&mut self) -> Option<Node> {
        self.nested(|p| {
            p.fold_left(NodeKind::CommaExpression, &[TokenKind::Comma], Self::parse_assignment_expression)
        })
    }

    /// Right-associative: `a = b = c` nests as `a = (b = c)`
    pub(super) fn parse_assignment_expression(&mut self) -> Option<Node> {
        let target = self.parse_conditional_expression()?;

        if !self.current().kind.is_assignment_op() {
            return Some(target);
        }
        let op = self.cursor.bump();
        let mut node = Node::new(NodeKind::AssignmentExpression, op.span)
            .with_attribute(op.lexeme)
            .with_child(target);
        let value = self.nested(Self::parse_assignment_expression);
        node.push_opt(value);
        Some(node)
    }

    /// `logical_or_expression ('?' expression ':' conditional_expression)?`
    fn parse_conditional_expression(&mut self) -> Option<Node> {
        let condition = self.parse_logical_or_expression()?;

        let Some(question) = self.cursor.bump_if(TokenKind::Question) else {
            return Some(condition);
        };
        let mut node = Node::new(NodeKind::ConditionalExpression, question.span)
            .with_attribute(question.lexeme)
            .with_child(condition);
        let then_expr = self.parse_expression();
        node.push_opt(then_expr);
        self.expect(TokenKind::Colon, "in conditional expression")?;
        let else_expr = self.nested(Self::parse_conditional_expression);
        node.push_opt(else_expr);
        Some(node)
    }

    fn parse_logical_or_expression(&mut self) -> Option<Node> {
        self.fold_left(NodeKind::LogicalOrExpression, &[TokenKind::PipePipe], Self::parse_logical_and_expression)
    }

    fn parse_logical_and_expression(&mut self) -> Option<Node> {
        self.fold_left(NodeKind::LogicalAndExpression, &[TokenKind::AmpAmp], Self::parse_inclusive_or_expression)
    }

    fn parse_inclusive_or_expression(&mut self) -> Option<Node> {
        self.fold_left(NodeKind::InclusiveOrExpression, &[TokenKind::Pipe], Self::parse_exclusive_or_expression)
    }

    fn parse_exclusive_or_expression(&mut self) -> Option<Node> {
        self.fold_left(NodeKind::ExclusiveOrExpression, &[TokenKind::Caret], Self::parse_and_expression)
    }

    fn parse_and_expression(&mut self) -> Option<Node> {
        self.fold_left(NodeKind::AndExpression, &[TokenKind::Amp], Self::parse_equality_expression)
    }

    fn parse_equality_expression(&mut self) -> Option<Node> {
        self.fold_left(
            NodeKind::EqualityExpression,
            &[TokenKind::EqEq, TokenKind::NotEq],
            Self::parse_relational_expression,
        )
    }

    fn parse_relational_expression(&mut self) -> Option<Node> {
        self.fold_left(
            NodeKind::RelationalExpression,
            &[TokenKind::Lt, TokenKind::Gt, TokenKind::LtEq, TokenKind::GtEq],
            Self::parse_shift_expression,
        )
    }

    fn parse_shift_expression(&mut self) -> Option<Node> {
        self.fold_left(
            NodeKind::ShiftExpression,
            &[TokenKind::LtLt, TokenKind::GtGt],
            Self::parse_additive_expression,
        )
    }

    fn parse_additive_expression(&mut self) -> Option<Node> {
        self.fold_left(
            NodeKind::AdditiveExpression,
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_multiplicative_expression,
        )
    }

    fn parse_multiplicative_expression(&mut self) -> Option<Node> {
        self.fold_left(
            NodeKind::MultiplicativeExpression,
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_cast_expression,
        )
    }

    /// Parse one `operand` and keep folding `left op operand` into a
    /// left-leaning chain while the current token is in `ops`
    fn fold_left(&mut self, kind: NodeKind, ops: &[TokenKind], operand: Level<'a>) -> Option<Node> {
        let mut left = operand(self)?;

        while ops.contains(&self.current().kind) {
            let op = self.cursor.bump();
            let mut node = Node::new(kind, op.span)
                .with_attribute(op.lexeme)
                .with_child(left);
            let right = operand(self);
            node.push_opt(right);
            left = node;
        }

        Some(left)
    }

    /// `(` followed by a type keyword, checked with a one-token peek
    fn at_parenthesized_type(&self) -> bool {
        self.check(TokenKind::LParen) && self.cursor.peek_nth(1).kind.is_type_specifier()
    }

    /// `'(' typename ')' cast_expression | unary_expression`
    fn parse_cast_expression(&mut self) -> Option<Node> {
        self.nested(|p| {
            if !p.at_parenthesized_type() {
                return p.parse_unary_expression();
            }

            let open = p.cursor.bump();
            let ty = p.parse_type_specifier()?;
            p.expect(TokenKind::RParen, "after type name in cast")?;

            let mut node = Node::new(NodeKind::CastExpression, open.span).with_child(ty);
            let operand = p.parse_cast_expression();
            node.push_opt(operand);
            Some(node)
        })
    }

    fn parse_unary_expression(&mut self) -> Option<Node> {
        match self.current().kind {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Tilde => {
                let op = self.cursor.bump();
                let mut node = Node::new(NodeKind::UnaryExpression, op.span).with_attribute(op.lexeme);
                let operand = self.parse_cast_expression();
                node.push_opt(operand);
                Some(node)
            }
            TokenKind::Sizeof => {
                let keyword = self.cursor.bump();
                let mut node = Node::new(NodeKind::SizeofExpression, keyword.span).with_attribute(keyword.lexeme);

                if self.at_parenthesized_type() {
                    self.cursor.bump();
                    let ty = self.parse_type_specifier()?;
                    let close = self.expect(TokenKind::RParen, "after type name in sizeof")?;
                    node.push(ty);
                    node.span = node.span.merge(close.span);
                } else {
                    let operand = self.parse_cast_expression();
                    node.push_opt(operand);
                }
                Some(node)
            }
            _ => self.parse_postfix_expression(),
        }
    }

    /// `primary_expression` followed by any number of `[i]`, `(args)`,
    /// `.name`, `->name`, `++` or `--`
    fn parse_postfix_expression(&mut self) -> Option<Node> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            match self.current().kind {
                TokenKind::LBracket => {
                    self.cursor.bump();
                    let mut node = Node::new(NodeKind::ArrayAccess, expr.span).with_child(expr);
                    let index = self.parse_expression();
                    node.push_opt(index);
                    let close = self.expect(TokenKind::RBracket, "after array index")?;
                    node.span = node.span.merge(close.span);
                    expr = node;
                }
                TokenKind::LParen => {
                    self.cursor.bump();
                    let mut node = Node::new(NodeKind::FunctionCall, expr.span).with_child(expr);
                    if !self.check(TokenKind::RParen) {
                        let args = self.parse_argument_expression_list();
                        node.push_opt(args);
                    }
                    let close = self.expect(TokenKind::RParen, "after function arguments")?;
                    node.span = node.span.merge(close.span);
                    expr = node;
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let op = self.cursor.bump();
                    let name = self.expect(TokenKind::Identifier, &format!("after '{}'", op.lexeme))?;
                    let member = Node::new(NodeKind::Identifier, name.span).with_attribute(name.lexeme);
                    expr = Node::new(NodeKind::MemberAccess, op.span)
                        .with_attribute(op.lexeme)
                        .with_child(expr)
                        .with_child(member);
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = self.cursor.bump();
                    expr = Node::new(NodeKind::PostfixExpression, op.span)
                        .with_attribute(op.lexeme)
                        .with_child(expr);
                }
                _ => break,
            }
        }

        Some(expr)
    }

    fn parse_argument_expression_list(&mut self) -> Option<Node> {
        let mut list = Node::new(NodeKind::ArgumentExpressionList, self.here());
        let first = self.parse_assignment_expression();
        list.push_opt(first);

        while self.cursor.bump_if(TokenKind::Comma).is_some() {
            let next = self.parse_assignment_expression();
            list.push_opt(next);
        }

        Some(list)
    }

    /// `identifier | constant | string | '(' expression ')'`
    fn parse_primary_expression(&mut self) -> Option<Node> {
        match self.current().kind {
            TokenKind::Identifier | TokenKind::Constant => {
                let token = self.cursor.bump();
                Some(Node::new(NodeKind::PrimaryExpression, token.span).with_attribute(token.lexeme))
            }
            TokenKind::StringLiteral => {
                let token = self.cursor.bump();
                Some(
                    Node::new(NodeKind::PrimaryExpression, token.span)
                        .with_attribute(format!("\"{}\"", token.lexeme)),
                )
            }
            TokenKind::LParen => {
                self.cursor.bump();
                let inner = self.parse_expression();
                self.expect(TokenKind::RParen, "to close parenthesized expression")?;
                inner
            }
            _ => {
                self.error_expected("identifier, constant, string literal or '(' in expression");
                None
            }
        }
    }
}
