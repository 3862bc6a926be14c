//! Generic traversal over the AST.
//!
//! Every node implements [`AstNode`], which exposes its kind, its range and
//! its children in source order. [`walk`] drives a pre-order traversal with
//! an explicit stack, so deep trees never recurse on the call stack.

use crate::kind::NodeKind;
use crate::node::*;
use jsfront_core::text::TextRange;
use jsfront_syntax::SyntaxKind;

/// Read-only view of any AST node.
pub trait AstNode {
    fn kind(&self) -> NodeKind;

    fn range(&self) -> TextRange;

    /// Call `f` for each child: structural children and keyword/label
    /// decorations, in source order. Punctuation is not a node.
    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn AstNode));
}

/// The visitor's verdict on a node during [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the node's children.
    Continue,
    /// Skip the node's children, continue with its next sibling.
    Prune,
    /// End the traversal.
    Stop,
}

/// Visit `root` and all its descendants in pre-order. Returns `false` if the
/// visitor stopped the walk.
pub fn walk<'a>(root: &'a dyn AstNode, visitor: &mut dyn FnMut(&'a dyn AstNode) -> Walk) -> bool {
    let mut stack: Vec<&'a dyn AstNode> = vec![root];
    let mut buffer: Vec<&'a dyn AstNode> = Vec::new();
    while let Some(node) = stack.pop() {
        match visitor(node) {
            Walk::Stop => return false,
            Walk::Prune => continue,
            Walk::Continue => {}
        }
        buffer.clear();
        node.for_each_child(&mut |child| buffer.push(child));
        stack.extend(buffer.drain(..).rev());
    }
    true
}

/// Collect the children of `node`.
pub fn children(node: &dyn AstNode) -> Vec<&dyn AstNode> {
    let mut out = Vec::new();
    node.for_each_child(&mut |child| out.push(child));
    out
}

// ============================================================================
// Leaves
// ============================================================================

macro_rules! leaf_node {
    ($ty:ty, $kind:expr) => {
        impl AstNode for $ty {
            fn kind(&self) -> NodeKind {
                $kind
            }

            fn range(&self) -> TextRange {
                self.range
            }

            fn for_each_child<'a>(&'a self, _f: &mut dyn FnMut(&'a dyn AstNode)) {}
        }
    };
}

leaf_node!(Keyword, NodeKind::Keyword);
leaf_node!(Label, NodeKind::Label);
leaf_node!(Comment, NodeKind::Comment);
leaf_node!(EmptyStatement, NodeKind::EmptyStatement);
leaf_node!(EmptyExpression, NodeKind::EmptyExpression);
leaf_node!(Identifier, NodeKind::Identifier);
leaf_node!(XmlAttributeIdentifier, NodeKind::XmlAttributeIdentifier);
leaf_node!(AsteriskExpression, NodeKind::AsteriskExpression);
leaf_node!(NullExpression, NodeKind::NullExpression);
leaf_node!(XmlTextFragment, NodeKind::XmlTextFragment);

impl AstNode for Literal {
    fn kind(&self) -> NodeKind {
        match self.kind {
            LiteralKind::Decimal => NodeKind::DecimalLiteral,
            LiteralKind::String => NodeKind::StringLiteral,
            LiteralKind::RegExp => NodeKind::RegExpLiteral,
            LiteralKind::Boolean => NodeKind::BooleanLiteral,
        }
    }

    fn range(&self) -> TextRange {
        self.range
    }

    fn for_each_child<'a>(&'a self, _f: &mut dyn FnMut(&'a dyn AstNode)) {}
}

// ============================================================================
// Interior nodes
// ============================================================================

/// Implements `AstNode` for a struct. The body yields children in source
/// order; the kind may depend on the node.
macro_rules! interior_node {
    ($ty:ty, |$node:ident| $kind:expr, |$this:ident, $f:ident| $body:block) => {
        impl AstNode for $ty {
            fn kind(&self) -> NodeKind {
                let $node = self;
                $kind
            }

            fn range(&self) -> TextRange {
                self.range
            }

            fn for_each_child<'a>(&'a self, $f: &mut dyn FnMut(&'a dyn AstNode)) {
                let $this = self;
                $body
            }
        }
    };
    ($ty:ty, $kind:expr, |$this:ident, $f:ident| $body:block) => {
        interior_node!($ty, |_node| $kind, |$this, $f| $body);
    };
}

fn each<'a, T: AstNode>(items: &'a [T], f: &mut dyn FnMut(&'a dyn AstNode)) {
    for item in items {
        f(item);
    }
}

fn maybe<'a, T: AstNode>(item: &'a Option<T>, f: &mut dyn FnMut(&'a dyn AstNode)) {
    if let Some(item) = item {
        f(item);
    }
}

impl AstNode for Script {
    fn kind(&self) -> NodeKind {
        NodeKind::Script
    }

    fn range(&self) -> TextRange {
        self.range
    }

    /// Statements and comments, merged by start offset. A comment goes first
    /// when both start at the same offset.
    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn AstNode)) {
        let mut statements = self.statements.iter().peekable();
        let mut comments = self.comments.iter().peekable();
        loop {
            match (statements.peek().copied(), comments.peek().copied()) {
                (Some(s), Some(c)) => {
                    if c.range.start <= s.range().start {
                        f(c);
                        comments.next();
                    } else {
                        f(s);
                        statements.next();
                    }
                }
                (Some(s), None) => {
                    f(s);
                    statements.next();
                }
                (None, Some(c)) => {
                    f(c);
                    comments.next();
                }
                (None, None) => break,
            }
        }
    }
}

interior_node!(Block, NodeKind::Block, |n, f| {
    each(&n.statements, f);
});

interior_node!(ExpressionStatement, NodeKind::ExpressionStatement, |n, f| {
    f(&n.expression);
});

interior_node!(ConstStatement, NodeKind::ConstStatement, |n, f| {
    f(&n.const_keyword);
    each(&n.declarations, f);
});

interior_node!(IfStatement, NodeKind::IfStatement, |n, f| {
    f(&n.if_keyword);
    f(&n.condition);
    f(&*n.then_statement);
    maybe(&n.else_keyword, f);
    if let Some(else_statement) = &n.else_statement {
        f(&**else_statement);
    }
});

interior_node!(WhileStatement, NodeKind::WhileStatement, |n, f| {
    f(&n.while_keyword);
    f(&n.condition);
    f(&*n.body);
});

interior_node!(DoWhileStatement, NodeKind::DoWhileStatement, |n, f| {
    f(&n.do_keyword);
    f(&*n.body);
    maybe(&n.while_keyword, f);
    f(&n.condition);
});

interior_node!(ForStatement, NodeKind::ForStatement, |n, f| {
    f(&n.for_keyword);
    f(&n.initial);
    f(&n.condition);
    f(&n.step);
    f(&*n.body);
});

interior_node!(
    ForInStatement,
    |n| if n.is_for_each() {
        NodeKind::ForEachInStatement
    } else {
        NodeKind::ForInStatement
    },
    |n, f| {
        f(&n.for_keyword);
        maybe(&n.each_keyword, f);
        f(&n.item);
        f(&n.in_keyword);
        f(&n.iterator);
        f(&*n.body);
    }
);

interior_node!(SwitchStatement, NodeKind::SwitchStatement, |n, f| {
    f(&n.switch_keyword);
    f(&n.condition);
    each(&n.clauses, f);
});

interior_node!(CaseClause, NodeKind::CaseClause, |n, f| {
    f(&n.case_keyword);
    f(&n.condition);
    each(&n.statements, f);
});

interior_node!(DefaultClause, NodeKind::DefaultClause, |n, f| {
    f(&n.default_keyword);
    each(&n.statements, f);
});

interior_node!(TryStatement, NodeKind::TryStatement, |n, f| {
    f(&n.try_keyword);
    f(&n.body);
    each(&n.catches, f);
    maybe(&n.finally, f);
});

interior_node!(CatchClause, NodeKind::CatchClause, |n, f| {
    f(&n.catch_keyword);
    f(&n.exception);
    maybe(&n.filter, f);
    f(&n.body);
});

interior_node!(ExceptionFilter, NodeKind::ExceptionFilter, |n, f| {
    f(&n.if_keyword);
    f(&n.expression);
});

interior_node!(FinallyClause, NodeKind::FinallyClause, |n, f| {
    f(&n.finally_keyword);
    f(&n.body);
});

interior_node!(ThrowStatement, NodeKind::ThrowStatement, |n, f| {
    f(&n.throw_keyword);
    f(&n.exception);
});

interior_node!(ReturnStatement, NodeKind::ReturnStatement, |n, f| {
    f(&n.return_keyword);
    maybe(&n.value, f);
});

interior_node!(
    JumpStatement,
    |n| if n.is_break() {
        NodeKind::BreakStatement
    } else {
        NodeKind::ContinueStatement
    },
    |n, f| {
        f(&n.keyword);
        maybe(&n.label, f);
    }
);

interior_node!(LabelledStatement, NodeKind::LabelledStatement, |n, f| {
    f(&n.label);
    f(&*n.statement);
});

interior_node!(WithStatement, NodeKind::WithStatement, |n, f| {
    f(&n.with_keyword);
    f(&n.expression);
    f(&*n.statement);
});

interior_node!(
    DefaultXmlNamespaceStatement,
    NodeKind::DefaultXmlNamespaceStatement,
    |n, f| {
        f(&n.default_keyword);
        f(&n.xml_keyword);
        maybe(&n.namespace_keyword, f);
        f(&n.value);
    }
);

interior_node!(Function, NodeKind::Function, |n, f| {
    f(&n.function_keyword);
    maybe(&n.name, f);
    each(&n.arguments, f);
    f(&n.body);
});

interior_node!(ThisExpression, NodeKind::ThisExpression, |n, f| {
    f(&n.this_keyword);
});

interior_node!(BinaryOperation, NodeKind::BinaryOperation, |n, f| {
    f(&*n.left);
    f(&*n.right);
});

interior_node!(UnaryOperation, NodeKind::UnaryOperation, |n, f| {
    f(&*n.expression);
});

interior_node!(
    KeywordOperation,
    |n| match n.keyword.token {
        SyntaxKind::DeleteKeyword => NodeKind::DeleteExpression,
        SyntaxKind::TypeOfKeyword => NodeKind::TypeOfExpression,
        SyntaxKind::VoidKeyword => NodeKind::VoidExpression,
        _ => NodeKind::YieldExpression,
    },
    |n, f| {
        f(&n.keyword);
        f(&*n.expression);
    }
);

interior_node!(NewExpression, NodeKind::NewExpression, |n, f| {
    f(&n.new_keyword);
    f(&*n.object_class);
});

interior_node!(CallExpression, NodeKind::CallExpression, |n, f| {
    f(&*n.expression);
    each(&n.arguments, f);
});

interior_node!(PropertyExpression, NodeKind::PropertyExpression, |n, f| {
    f(&*n.object);
    f(&*n.property);
});

interior_node!(GetAllChildrenExpression, NodeKind::GetAllChildrenExpression, |n, f| {
    f(&*n.object);
    f(&*n.property);
});

interior_node!(GetLocalNameExpression, NodeKind::GetLocalNameExpression, |n, f| {
    f(&*n.namespace);
    f(&*n.local_name);
});

interior_node!(GetArrayItemExpression, NodeKind::GetArrayItemExpression, |n, f| {
    f(&*n.array);
    f(&*n.index);
});

interior_node!(ArrayInitializer, NodeKind::ArrayInitializer, |n, f| {
    each(&n.items, f);
});

interior_node!(ObjectInitializer, NodeKind::ObjectInitializer, |n, f| {
    each(&n.initializers, f);
});

interior_node!(PropertyInitializer, NodeKind::PropertyInitializer, |n, f| {
    f(&n.name);
    f(&n.value);
});

interior_node!(GetMethod, NodeKind::GetMethod, |n, f| {
    f(&n.get_keyword);
    f(&n.name);
    f(&n.body);
});

interior_node!(SetMethod, NodeKind::SetMethod, |n, f| {
    f(&n.set_keyword);
    f(&n.name);
    f(&n.argument);
    f(&n.body);
});

interior_node!(ConditionalExpression, NodeKind::ConditionalExpression, |n, f| {
    f(&*n.condition);
    f(&*n.true_value);
    f(&*n.false_value);
});

interior_node!(CommaExpression, NodeKind::CommaExpression, |n, f| {
    each(&n.items, f);
});

interior_node!(ParenthesizedExpression, NodeKind::ParenthesizedExpression, |n, f| {
    f(&*n.expression);
});

interior_node!(VariableDeclaration, NodeKind::VariableDeclaration, |n, f| {
    f(&n.var_keyword);
    each(&n.declarations, f);
});

interior_node!(VariableDeclarator, NodeKind::VariableDeclarator, |n, f| {
    f(&n.name);
    maybe(&n.initializer, f);
});

interior_node!(XmlLiteral, NodeKind::XmlLiteral, |n, f| {
    each(&n.fragments, f);
});

interior_node!(XmlExpressionFragment, NodeKind::XmlExpressionFragment, |n, f| {
    f(&n.expression);
});

// ============================================================================
// Enums delegate to their payload
// ============================================================================

macro_rules! delegate_node {
    ($ty:ident { $($variant:ident),* $(,)? }) => {
        impl $ty {
            /// The payload as a generic node.
            pub fn as_node(&self) -> &dyn AstNode {
                match self {
                    $($ty::$variant(inner) => inner,)*
                }
            }
        }

        impl AstNode for $ty {
            fn kind(&self) -> NodeKind {
                self.as_node().kind()
            }

            fn range(&self) -> TextRange {
                self.as_node().range()
            }

            fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn AstNode)) {
                match self {
                    $($ty::$variant(inner) => inner.for_each_child(f),)*
                }
            }
        }
    };
}

delegate_node!(Statement {
    Block,
    Empty,
    Expression,
    Const,
    If,
    While,
    DoWhile,
    For,
    ForIn,
    Switch,
    Try,
    Throw,
    Return,
    Jump,
    Labelled,
    With,
    Function,
    DefaultXmlNamespace,
});

delegate_node!(Expression {
    Empty,
    Identifier,
    XmlAttribute,
    Asterisk,
    Literal,
    Null,
    This,
    Binary,
    Unary,
    KeywordOperation,
    New,
    Call,
    Property,
    GetAllChildren,
    GetLocalName,
    ArrayItem,
    Array,
    Object,
    Conditional,
    Comma,
    Parenthesized,
    Function,
    Variable,
    Xml,
});

delegate_node!(SwitchClause { Case, Default });

delegate_node!(ObjectMember { Property, Get, Set });

delegate_node!(XmlFragment { Text, Expression });

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(start: u32, token: SyntaxKind) -> Keyword {
        let len = token.keyword_text().map_or(0, str::len) as u32;
        Keyword::new(TextRange::new(start, start + len), token)
    }

    fn ident(start: u32, name: &str) -> Identifier {
        Identifier {
            range: TextRange::at(start, name.len()),
            name: name.to_string(),
        }
    }

    /// `if (a) b; // c`
    fn sample() -> Script {
        let statement = Statement::If(IfStatement {
            range: TextRange::new(0, 9),
            if_keyword: keyword(0, SyntaxKind::IfKeyword),
            lp: Some(3),
            condition: Expression::Identifier(ident(4, "a")),
            rp: Some(5),
            then_statement: Box::new(Statement::Expression(ExpressionStatement {
                range: TextRange::new(7, 9),
                expression: Expression::Identifier(ident(7, "b")),
                semicolon: Some(8),
            })),
            else_keyword: None,
            else_statement: None,
        });
        Script {
            range: TextRange::new(0, 14),
            statements: vec![statement],
            comments: vec![Comment {
                range: TextRange::new(10, 14),
                text: "// c".to_string(),
                kind: CommentKind::SingleLine,
            }],
        }
    }

    #[test]
    fn test_children_in_source_order() {
        let script = sample();
        let kinds: Vec<NodeKind> = children(&script).iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::IfStatement, NodeKind::Comment]);

        let if_children: Vec<NodeKind> = children(&script.statements[0])
            .iter()
            .map(|n| n.kind())
            .collect();
        assert_eq!(
            if_children,
            vec![
                NodeKind::Keyword,
                NodeKind::Identifier,
                NodeKind::ExpressionStatement
            ]
        );
    }

    #[test]
    fn test_comment_first_on_equal_start() {
        let mut script = sample();
        script.comments[0].range = TextRange::new(0, 0);
        let kinds: Vec<NodeKind> = children(&script).iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Comment, NodeKind::IfStatement]);
    }

    #[test]
    fn test_walk_pre_order() {
        let script = sample();
        let mut seen = Vec::new();
        assert!(walk(&script, &mut |node| {
            seen.push(node.kind());
            Walk::Continue
        }));
        assert_eq!(
            seen,
            vec![
                NodeKind::Script,
                NodeKind::IfStatement,
                NodeKind::Keyword,
                NodeKind::Identifier,
                NodeKind::ExpressionStatement,
                NodeKind::Identifier,
                NodeKind::Comment,
            ]
        );
    }

    #[test]
    fn test_walk_prune_and_stop() {
        let script = sample();
        let mut seen = Vec::new();
        walk(&script, &mut |node| {
            seen.push(node.kind());
            if node.kind() == NodeKind::IfStatement {
                Walk::Prune
            } else {
                Walk::Continue
            }
        });
        assert_eq!(
            seen,
            vec![NodeKind::Script, NodeKind::IfStatement, NodeKind::Comment]
        );

        let mut count = 0;
        let finished = walk(&script, &mut |node| {
            count += 1;
            if node.kind() == NodeKind::Keyword {
                Walk::Stop
            } else {
                Walk::Continue
            }
        });
        assert!(!finished);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_variant_kinds() {
        let jump = JumpStatement {
            range: TextRange::new(0, 5),
            keyword: keyword(0, SyntaxKind::ContinueKeyword),
            label: None,
            semicolon: None,
        };
        assert_eq!(jump.kind(), NodeKind::ContinueStatement);

        let op = KeywordOperation {
            range: TextRange::new(0, 8),
            keyword: keyword(0, SyntaxKind::TypeOfKeyword),
            expression: Box::new(Expression::Identifier(ident(7, "x"))),
        };
        assert_eq!(Expression::KeywordOperation(op).kind(), NodeKind::TypeOfExpression);
        assert_eq!(keyword(0, SyntaxKind::TypeOfKeyword).text(), "typeof");
    }
}
