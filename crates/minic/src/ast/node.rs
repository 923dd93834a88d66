//! Generic syntax tree node

use crate::common::Span;

/// Grammar construct a [`Node`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // === Top level and declarations ===
    TranslationUnit,
    FunctionDefinition,
    Declaration,
    InitDeclaratorList,
    InitDeclarator,
    /// Declared name in `attribute`; an optional [`NodeKind::ParameterList`] child
    Declarator,
    ParameterList,
    /// Parameter name in `attribute`; one [`NodeKind::TypeSpecifier`] child
    ParameterDeclaration,
    TypeSpecifier,

    // === Statements ===
    CompoundStatement,
    ExpressionStatement,
    SelectionStatement,
    IterationStatement,
    JumpStatement,

    // === Expressions, lowest precedence first ===
    CommaExpression,
    AssignmentExpression,
    ConditionalExpression,
    LogicalOrExpression,
    LogicalAndExpression,
    InclusiveOrExpression,
    ExclusiveOrExpression,
    AndExpression,
    EqualityExpression,
    RelationalExpression,
    ShiftExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    CastExpression,
    UnaryExpression,
    SizeofExpression,
    ArrayAccess,
    FunctionCall,
    ArgumentExpressionList,
    MemberAccess,
    PostfixExpression,
    PrimaryExpression,
    Identifier,
}

impl NodeKind {
    /// Grammar name used in tree dumps
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation_unit",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::Declaration => "declaration",
            NodeKind::InitDeclaratorList => "init_declarator_list",
            NodeKind::InitDeclarator => "init_declarator",
            NodeKind::Declarator => "declarator",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::ParameterDeclaration => "parameter_declaration",
            NodeKind::TypeSpecifier => "type_specifier",
            NodeKind::CompoundStatement => "compound_statement",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::SelectionStatement => "selection_statement",
            NodeKind::IterationStatement => "iteration_statement",
            NodeKind::JumpStatement => "jump_statement",
            NodeKind::CommaExpression => "comma_expression",
            NodeKind::AssignmentExpression => "assignment_expression",
            NodeKind::ConditionalExpression => "conditional_expression",
            NodeKind::LogicalOrExpression => "logical_or_expression",
            NodeKind::LogicalAndExpression => "logical_and_expression",
            NodeKind::InclusiveOrExpression => "inclusive_or_expression",
            NodeKind::ExclusiveOrExpression => "exclusive_or_expression",
            NodeKind::AndExpression => "and_expression",
            NodeKind::EqualityExpression => "equality_expression",
            NodeKind::RelationalExpression => "relational_expression",
            NodeKind::ShiftExpression => "shift_expression",
            NodeKind::AdditiveExpression => "additive_expression",
            NodeKind::MultiplicativeExpression => "multiplicative_expression",
            NodeKind::CastExpression => "cast_expression",
            NodeKind::UnaryExpression => "unary_expression",
            NodeKind::SizeofExpression => "sizeof_expression",
            NodeKind::ArrayAccess => "array_access",
            NodeKind::FunctionCall => "function_call",
            NodeKind::ArgumentExpressionList => "argument_expression_list",
            NodeKind::MemberAccess => "member_access",
            NodeKind::PostfixExpression => "postfix_expression",
            NodeKind::PrimaryExpression => "primary_expression",
            NodeKind::Identifier => "identifier",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Syntax tree node.
///
/// Children are owned directly, so dropping a node drops its whole subtree.
/// Operators, names, literals and keywords live in `attribute`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub attribute: Option<String>,
    pub children: Vec<Node>,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            attribute: None,
            children: Vec::new(),
            span,
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.push(child);
        self
    }

    /// Append a child, widening this node's span to cover it
    pub fn push(&mut self, child: Node) {
        self.span = self.span.merge(child.span);
        self.children.push(child);
    }

    /// Append the child if the production that built it succeeded
    pub fn push_opt(&mut self, child: Option<Node>) {
        if let Some(child) = child {
            self.push(child);
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Pre-order walk over this subtree, `self` first
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// First node of `kind` in pre-order, including `self`
    pub fn find_first(&self, kind: NodeKind) -> Option<&Node> {
        self.iter().find(|node| node.kind == kind)
    }

    /// All nodes of `kind` in pre-order
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        self.iter().filter(|node| node.kind == kind).collect()
    }

    /// Number of nodes in this subtree
    pub fn count_nodes(&self) -> usize {
        self.iter().count()
    }

    /// Height of this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

// Trees can be as deep as the input is long (`1+1+...` folds into a
// left-leaning chain), so subtrees are torn down from an explicit stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Iterator returned by [`Node::iter`]
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> IntoIterator for &'a Node {
    type Item = &'a Node;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
