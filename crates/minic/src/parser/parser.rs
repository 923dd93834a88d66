//! Recursive descent parser: declarations and statements
//!
//! Every production returns `Option<Node>`. A production that cannot match
//! records a diagnostic and returns `None`; its parent either leaves the
//! slot empty or gives up itself. There is no resynchronisation beyond
//! that, so one malformed construct may cascade into further diagnostics.

use crate::ast::{Node, NodeKind};
use crate::common::{CompileError, Position, Span};
use crate::lexer::{Token, TokenKind};

use super::cursor::Cursor;

/// Deepest nesting of statements and expressions the parser follows before
/// giving up on a construct
pub const MAX_NESTING: usize = 256;

/// Outcome of the bounded declaration lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationForm {
    /// `type identifier (`
    FunctionDefinition,
    /// `type identifier` followed by anything but `(`
    Declaration,
}

/// Result of parsing a whole token sequence
#[derive(Debug)]
pub struct ParseOutput {
    /// Always a `translation_unit` node, possibly with missing subtrees
    pub root: Node,
    pub errors: Vec<CompileError>,
    /// The cursor reached the trailing end-of-file token
    pub consumed: bool,
    /// First token left unconsumed when parsing stopped short
    pub stopped_at: Option<Token>,
}

impl ParseOutput {
    pub fn is_success(&self) -> bool {
        self.consumed
    }
}

/// Recursive descent parser
pub struct Parser<'a> {
    pub(super) cursor: Cursor<'a>,
    errors: Vec<CompileError>,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over `tokens`, normally the output of the lexer
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            cursor: Cursor::new(tokens),
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Parse a complete translation unit
    pub fn parse(&mut self) -> Node {
        self.parse_translation_unit()
    }

    /// Parse and package the tree with its diagnostics
    pub fn parse_all(mut self) -> ParseOutput {
        let root = self.parse();
        let consumed = self.is_fully_consumed();
        let stopped_at = (!consumed).then(|| self.cursor.peek().clone());
        ParseOutput {
            root,
            errors: self.errors,
            consumed,
            stopped_at,
        }
    }

    /// True when every token before the end-of-file sentinel was consumed
    pub fn is_fully_consumed(&self) -> bool {
        self.cursor.position() == self.cursor.end_index()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    pub(super) fn current(&self) -> &Token {
        self.cursor.peek()
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.cursor.check(kind)
    }

    pub(super) fn describe(token: &Token) -> String {
        match token.kind {
            TokenKind::Identifier | TokenKind::Constant => {
                format!("{} '{}'", token.kind, token.lexeme)
            }
            kind => kind.to_string(),
        }
    }

    pub(super) fn error_at(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(CompileError::parser(
            message,
            token.span,
            Position::new(token.line, token.column),
        ));
    }

    /// Record `expected <what>, found <current>` at the current token
    pub(super) fn error_expected(&mut self, what: &str) {
        let token = self.current().clone();
        let message = format!("expected {what}, found {}", Self::describe(&token));
        self.error_at(&token, message);
    }

    pub(super) fn expect(&mut self, kind: TokenKind, context: &str) -> Option<Token> {
        if let Some(token) = self.cursor.bump_if(kind) {
            Some(token)
        } else {
            self.error_expected(&format!("{kind} {context}"));
            None
        }
    }

    /// Span of the current token, used to anchor a node before its children exist
    /// Run `parse` one nesting level deeper. Past [`MAX_NESTING`] levels
    /// this records an error and yields `None` without consuming anything.
    pub(super) fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<Node>) -> Option<Node> {
        if self.depth >= MAX_NESTING {
            let token = self.current().clone();
            self.error_at(&token, "nesting too deep");
            return None;
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    pub(super) fn here(&self) -> Span {
        self.current().span
    }

    /// Decide between a declaration and a function definition.
    ///
    /// Looks at no more than three tokens: a type keyword, an identifier and
    /// the token after it. The cursor is restored before returning, whatever
    /// the outcome, so this never consumes input. `None` means neither
    /// prefix matched.
    pub fn classify_declaration(&mut self) -> Option<DeclarationForm> {
        let start = self.cursor.checkpoint();

        let mut form = None;
        if self.current().kind.is_type_specifier() {
            self.cursor.bump();
            if self.cursor.bump_if(TokenKind::Identifier).is_some() {
                form = Some(if self.check(TokenKind::LParen) {
                    DeclarationForm::FunctionDefinition
                } else {
                    DeclarationForm::Declaration
                });
            }
        }

        self.cursor.restore(start);
        form
    }

    // =========================================================================
    // External declarations (top-level)
    // =========================================================================

    fn parse_translation_unit(&mut self) -> Node {
        let start = self.here();
        let mut unit = Node::new(NodeKind::TranslationUnit, Span::new(start.start, start.start));

        while !self.cursor.at_end() {
            let before = self.cursor.position();
            let decl = self.parse_external_declaration();
            unit.push_opt(decl);
            if self.cursor.position() == before {
                break;
            }
        }

        unit
    }

    fn parse_external_declaration(&mut self) -> Option<Node> {
        match self.classify_declaration() {
            Some(DeclarationForm::FunctionDefinition) => self.parse_function_definition(),
            Some(DeclarationForm::Declaration) => self.parse_declaration(),
            None => {
                self.error_expected("declaration or function definition");
                None
            }
        }
    }

    /// `type_specifier declarator compound_statement`
    ///
    /// A declarator followed by `;` is a prototype and becomes a
    /// `declaration` built from the parts already parsed.
    fn parse_function_definition(&mut self) -> Option<Node> {
        let ty = self.parse_type_specifier()?;
        let declarator = self.parse_declarator()?;

        if self.check(TokenKind::Semi) {
            self.cursor.bump();
            let init = Node::new(NodeKind::InitDeclarator, declarator.span).with_child(declarator);
            let list = Node::new(NodeKind::InitDeclaratorList, init.span).with_child(init);
            return Some(
                Node::new(NodeKind::Declaration, ty.span)
                    .with_child(ty)
                    .with_child(list),
            );
        }

        let mut func = Node::new(NodeKind::FunctionDefinition, ty.span)
            .with_child(ty)
            .with_child(declarator);
        let body = self.parse_compound_statement();
        func.push_opt(body);
        Some(func)
    }

    /// `type_specifier init_declarator_list ';'`
    pub(super) fn parse_declaration(&mut self) -> Option<Node> {
        let ty = self.parse_type_specifier()?;
        let list = self.parse_init_declarator_list();
        self.expect(TokenKind::Semi, "at end of declaration")?;

        let mut decl = Node::new(NodeKind::Declaration, ty.span).with_child(ty);
        decl.push_opt(list);
        Some(decl)
    }

    fn parse_init_declarator_list(&mut self) -> Option<Node> {
        let mut list = Node::new(NodeKind::InitDeclaratorList, self.here());
        let first = self.parse_init_declarator();
        list.push_opt(first);

        while self.cursor.bump_if(TokenKind::Comma).is_some() {
            let next = self.parse_init_declarator();
            list.push_opt(next);
        }

        Some(list)
    }

    /// `declarator ('=' initializer)?`
    fn parse_init_declarator(&mut self) -> Option<Node> {
        let declarator = self.parse_declarator()?;
        let mut init = Node::new(NodeKind::InitDeclarator, declarator.span).with_child(declarator);

        if self.cursor.bump_if(TokenKind::Eq).is_some() {
            let value = self.parse_initializer();
            init.push_opt(value);
        }

        Some(init)
    }

    /// `identifier ( '(' parameter_list? ')' )?`
    fn parse_declarator(&mut self) -> Option<Node> {
        let name = self.expect(TokenKind::Identifier, "in declarator")?;
        let mut declarator = Node::new(NodeKind::Declarator, name.span).with_attribute(name.lexeme);

        if self.cursor.bump_if(TokenKind::LParen).is_some() {
            if !self.check(TokenKind::RParen) {
                let params = self.parse_parameter_list();
                declarator.push_opt(params);
            }
            let close = self.expect(TokenKind::RParen, "after parameter list")?;
            declarator.span = declarator.span.merge(close.span);
        }

        Some(declarator)
    }

    fn parse_parameter_list(&mut self) -> Option<Node> {
        let mut list = Node::new(NodeKind::ParameterList, self.here());
        let first = self.parse_parameter_declaration();
        list.push_opt(first);

        while self.cursor.bump_if(TokenKind::Comma).is_some() {
            let next = self.parse_parameter_declaration();
            list.push_opt(next);
        }

        Some(list)
    }

    /// `type_specifier identifier`
    fn parse_parameter_declaration(&mut self) -> Option<Node> {
        let ty = self.parse_type_specifier()?;
        let name = self.expect(TokenKind::Identifier, "in parameter declaration")?;

        Some(
            Node::new(NodeKind::ParameterDeclaration, ty.span.merge(name.span))
                .with_attribute(name.lexeme)
                .with_child(ty),
        )
    }

    pub(super) fn parse_type_specifier(&mut self) -> Option<Node> {
        if self.current().kind.is_type_specifier() {
            let token = self.cursor.bump();
            Some(Node::new(NodeKind::TypeSpecifier, token.span).with_attribute(token.lexeme))
        } else {
            self.error_expected("type specifier");
            None
        }
    }

    fn parse_initializer(&mut self) -> Option<Node> {
        self.parse_assignment_expression()
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// `'{' (declaration | statement)* '}'`
    fn parse_compound_statement(&mut self) -> Option<Node> {
        let open = self.expect(TokenKind::LBrace, "at start of compound statement")?;
        let mut block = Node::new(NodeKind::CompoundStatement, open.span);

        while !self.check(TokenKind::RBrace) && !self.cursor.at_end() {
            let before = self.cursor.position();

            // A function-shaped prefix in a block is a local prototype
            let item = if self.classify_declaration().is_some() {
                self.parse_declaration()
            } else {
                self.parse_statement()
            };
            block.push_opt(item);

            if self.cursor.position() == before {
                self.cursor.bump();
            }
        }

        let close = self.expect(TokenKind::RBrace, "at end of compound statement")?;
        block.span = block.span.merge(close.span);
        Some(block)
    }

    fn parse_statement(&mut self) -> Option<Node> {
        self.nested(|p| match p.current().kind {
            TokenKind::LBrace => p.parse_compound_statement(),
            TokenKind::If => p.parse_selection_statement(),
            TokenKind::While | TokenKind::For => p.parse_iteration_statement(),
            TokenKind::Return | TokenKind::Break | TokenKind::Continue => p.parse_jump_statement(),
            kind if kind == TokenKind::Semi || kind.can_start_expression() => {
                p.parse_expression_statement()
            }
            _ => {
                let token = p.cursor.bump();
                let message = format!("unsupported statement starting with {}", Self::describe(&token));
                p.error_at(&token, message);
                None
            }
        })
    }

    /// `'if' '(' expression ')' statement ('else' statement)?`
    fn parse_selection_statement(&mut self) -> Option<Node> {
        let keyword = self.cursor.bump();
        self.expect(TokenKind::LParen, "after 'if'")?;
        let condition = self.parse_expression();
        self.expect(TokenKind::RParen, "after if condition")?;

        let mut node = Node::new(NodeKind::SelectionStatement, keyword.span).with_attribute(keyword.lexeme);
        node.push_opt(condition);
        let then_branch = self.parse_statement();
        node.push_opt(then_branch);

        if self.cursor.bump_if(TokenKind::Else).is_some() {
            let else_branch = self.parse_statement();
            node.push_opt(else_branch);
        }

        Some(node)
    }

    /// `while (cond) body` or `for (init; cond; step) body`.
    ///
    /// The body is always the last child; a `for` without a step
    /// expression has one child fewer.
    fn parse_iteration_statement(&mut self) -> Option<Node> {
        let keyword = self.cursor.bump();
        let mut node = Node::new(NodeKind::IterationStatement, keyword.span).with_attribute(keyword.lexeme.clone());

        if keyword.is(TokenKind::While) {
            self.expect(TokenKind::LParen, "after 'while'")?;
            let condition = self.parse_expression();
            self.expect(TokenKind::RParen, "after while condition")?;
            node.push_opt(condition);
        } else {
            self.expect(TokenKind::LParen, "after 'for'")?;

            let init = if self.classify_declaration() == Some(DeclarationForm::Declaration) {
                self.parse_declaration()
            } else {
                self.parse_expression_statement()
            };
            node.push_opt(init);

            let condition = self.parse_expression_statement();
            node.push_opt(condition);

            if !self.check(TokenKind::RParen) {
                let step = self.parse_expression();
                node.push_opt(step);
            }
            self.expect(TokenKind::RParen, "after for clauses")?;
        }

        let body = self.parse_statement();
        node.push_opt(body);
        Some(node)
    }

    /// `'return' expression? ';'`, `'break' ';'` or `'continue' ';'`
    fn parse_jump_statement(&mut self) -> Option<Node> {
        let keyword = self.cursor.bump();
        let mut node = Node::new(NodeKind::JumpStatement, keyword.span).with_attribute(keyword.lexeme.clone());

        if keyword.is(TokenKind::Return) {
            if !self.check(TokenKind::Semi) {
                let value = self.parse_expression();
                node.push_opt(value);
            }
            // A missing ';' after a return value keeps the statement
            if let Some(semi) = self.expect(TokenKind::Semi, "after return statement") {
                node.span = node.span.merge(semi.span);
            }
            return Some(node);
        }

        let semi = self.expect(TokenKind::Semi, &format!("after '{}'", keyword.lexeme))?;
        node.span = node.span.merge(semi.span);
        Some(node)
    }

    /// `expression? ';'`
    pub(super) fn parse_expression_statement(&mut self) -> Option<Node> {
        let mut node = Node::new(NodeKind::ExpressionStatement, self.here());

        if !self.check(TokenKind::Semi) {
            let expr = self.parse_expression();
            node.push_opt(expr);
        }
        if let Some(semi) = self.expect(TokenKind::Semi, "at end of expression statement") {
            node.span = node.span.merge(semi.span);
        }

        Some(node)
    }
}

/// Parse a token sequence into a translation unit
pub fn parse_tokens(tokens: &[Token]) -> ParseOutput {
    Parser::new(tokens).parse_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::dump;
    use crate::lexer::scan;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParseOutput {
        let lexed = scan(source);
        assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
        parse_tokens(&lexed.tokens)
    }

    #[test]
    fn test_parse_variable_declaration() {
        let out = parse("int x;");
        assert!(out.is_success());
        assert!(out.errors.is_empty());

        let decl = out.root.child(0).expect("declaration");
        assert_eq!(decl.kind, NodeKind::Declaration);
        assert_eq!(decl.children.len(), 2);

        let ty = &decl.children[0];
        assert_eq!((ty.kind, ty.attribute()), (NodeKind::TypeSpecifier, Some("int")));

        let list = &decl.children[1];
        assert_eq!(list.kind, NodeKind::InitDeclaratorList);
        assert_eq!(list.children.len(), 1);
        let init = &list.children[0];
        assert_eq!(init.kind, NodeKind::InitDeclarator);
        assert_eq!(init.children.len(), 1);
        assert_eq!(
            (init.children[0].kind, init.children[0].attribute()),
            (NodeKind::Declarator, Some("x"))
        );
    }

    #[test]
    fn test_parse_simple_function() {
        let out = parse("int f(int a){ return a; }");
        assert!(out.is_success());
        assert!(out.errors.is_empty());
        assert_eq!(
            dump(&out.root),
            "translation_unit
  function_definition
    type_specifier: int
    declarator: f
      parameter_list
        parameter_declaration: a
          type_specifier: int
    compound_statement
      jump_statement: return
        primary_expression: a
"
        );
    }

    #[test]
    fn test_parse_initialized_declarators() {
        let out = parse("int x = 5, y, z = x + 1;");
        assert!(out.is_success());
        let list = out.root.find_first(NodeKind::InitDeclaratorList).expect("list");
        assert_eq!(list.children.len(), 3);
        assert_eq!(list.children[0].children.len(), 2);
        assert_eq!(list.children[1].children.len(), 1);
        assert_eq!(list.children[2].children[1].kind, NodeKind::AdditiveExpression);
    }

    #[test]
    fn test_classify_does_not_move_cursor() {
        let tokens = scan("int f(int a){ return a; } int x = 5;").tokens;
        let mut parser = Parser::new(&tokens);

        assert_eq!(parser.classify_declaration(), Some(DeclarationForm::FunctionDefinition));
        assert_eq!(parser.position(), 0);
        assert_eq!(parser.classify_declaration(), Some(DeclarationForm::FunctionDefinition));
        assert_eq!(parser.position(), 0);

        // Skip to `int x = 5;`
        while !parser.check(TokenKind::RBrace) {
            parser.cursor.bump();
        }
        parser.cursor.bump();
        let before = parser.position();
        assert_eq!(parser.classify_declaration(), Some(DeclarationForm::Declaration));
        assert_eq!(parser.position(), before);
    }

    #[test]
    fn test_classify_failure_does_not_move_cursor() {
        for source in ["x = 1;", "int 5;", "int;", ""] {
            let tokens = scan(source).tokens;
            let mut parser = Parser::new(&tokens);
            assert_eq!(parser.classify_declaration(), None, "{source:?}");
            assert_eq!(parser.position(), 0);
        }
    }

    #[test]
    fn test_function_and_declaration_kinds() {
        let out = parse("int f(int a){ return a; }");
        assert_eq!(out.root.children[0].kind, NodeKind::FunctionDefinition);

        let out = parse("int x = 5;");
        assert_eq!(out.root.children[0].kind, NodeKind::Declaration);
    }

    #[test]
    fn test_full_consumption() {
        let tokens = scan("int main() { int i = 0; while (i < 10) i = i + 1; return i; }").tokens;
        let mut parser = Parser::new(&tokens);
        parser.parse();
        assert!(parser.errors().is_empty());
        assert!(parser.is_fully_consumed());
        assert_eq!(parser.position(), tokens.len() - 1);
    }

    #[test]
    fn test_missing_initializer_is_local() {
        let out = parse("int x = ;");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message().contains("expected"));

        let init = out.root.find_first(NodeKind::InitDeclarator).expect("init declarator");
        assert_eq!(init.children.len(), 1);
        assert_eq!(init.children[0].kind, NodeKind::Declarator);
        assert!(out.is_success());
    }

    #[test]
    fn test_prototype_becomes_declaration() {
        let out = parse("int add(int a, int b); int main() { int g(int c); return add(1, 2); }");
        assert!(out.is_success());
        assert!(out.errors.is_empty());

        assert_eq!(out.root.children[0].kind, NodeKind::Declaration);
        let proto = out.root.children[0].find_first(NodeKind::Declarator).expect("declarator");
        assert_eq!(proto.attribute(), Some("add"));
        assert_eq!(proto.find_all(NodeKind::ParameterDeclaration).len(), 2);

        let body = out.root.children[1].find_first(NodeKind::CompoundStatement).expect("body");
        assert_eq!(body.children[0].kind, NodeKind::Declaration);
    }

    #[test]
    fn test_statements() {
        let out = parse("void_t;");
        // `void_t` is an identifier, not a type
        assert!(!out.is_success());

        let out = parse(
            "int f(int n) {
                int total = 0;
                for (int i = 0; i < n; i++) {
                    if (i == 3) continue; else total += i;
                    if (total > 100) break;
                }
                for (;;) return total;
                ;
            }",
        );
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        assert!(out.is_success());

        let loops = out.root.find_all(NodeKind::IterationStatement);
        assert_eq!(loops.len(), 2);
        assert_eq!(loops[0].attribute(), Some("for"));
        assert_eq!(loops[0].children[0].kind, NodeKind::Declaration);
        assert_eq!(loops[0].children[2].kind, NodeKind::PostfixExpression);
        assert_eq!(loops[0].children[3].kind, NodeKind::CompoundStatement);
        // for (;;): two empty expression statements and the body
        assert_eq!(loops[1].children.len(), 3);

        let ifs = out.root.find_all(NodeKind::SelectionStatement);
        assert_eq!(ifs.len(), 2);
        assert_eq!(ifs[0].children.len(), 3);
        assert_eq!(ifs[1].children.len(), 2);

        let jumps: Vec<_> = out
            .root
            .find_all(NodeKind::JumpStatement)
            .into_iter()
            .filter_map(Node::attribute)
            .collect();
        assert_eq!(jumps, vec!["continue", "break", "return"]);
    }

    #[test]
    fn test_top_level_garbage_stops_parse() {
        let out = parse("int x; x = 1; int y;");
        assert!(!out.is_success());
        assert_eq!(out.root.children.len(), 1);
        assert_eq!(out.errors.len(), 1);
        let stopped = out.stopped_at.expect("stopped token");
        assert_eq!(stopped.lexeme, "x");
        assert_eq!(stopped.column, 8);
    }

    #[test]
    fn test_missing_semicolon_drops_declaration() {
        let out = parse("int x int y;");
        assert!(!out.errors.is_empty());
        assert!(out.errors[0].message().contains("';'"));
        // The broken declaration is absent, the following one survives
        assert_eq!(out.root.children.len(), 1);
        assert_eq!(
            out.root.find_first(NodeKind::Declarator).and_then(Node::attribute),
            Some("y")
        );
    }

    #[test]
    fn test_unclosed_block_reports_and_terminates() {
        let out = parse("int main() { return 0;");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message().contains("'}'"));
        let func = &out.root.children[0];
        assert_eq!(func.kind, NodeKind::FunctionDefinition);
        assert_eq!(func.children.len(), 2);
        assert!(out.is_success());
    }

    #[test]
    fn test_unsupported_statement_is_skipped() {
        let out = parse("int main() { ) x = 1; }");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message().contains("unsupported statement"));
        assert_eq!(out.root.find_all(NodeKind::ExpressionStatement).len(), 1);
        assert!(out.is_success());
    }

    #[test]
    fn test_deep_blocks_hit_nesting_limit() {
        let depth = 3_000;
        let source = format!("int main() {{ {}{} }}", "{".repeat(depth), "}".repeat(depth));
        let too_deep = std::thread::Builder::new()
            .stack_size(32 << 20)
            .spawn(move || {
                let out = parse(&source);
                out.errors.iter().any(|e| e.message() == "nesting too deep")
            })
            .expect("spawn parser thread")
            .join()
            .expect("parser thread panicked");
        assert!(too_deep);
    }

    #[test]
    fn test_nesting_below_limit_is_clean() {
        let source = format!("int main() {{ {}{} }}", "{".repeat(40), "}".repeat(40));
        let out = parse(&source);
        assert!(out.errors.is_empty());
        assert!(out.is_success());
        assert_eq!(out.root.find_all(NodeKind::CompoundStatement).len(), 41);
    }
}
