//! Node kinds.

use std::fmt;

/// The kind of an AST node. One tag per node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Script,

    // Statements
    Block,
    EmptyStatement,
    ExpressionStatement,
    ConstStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    ForEachInStatement,
    SwitchStatement,
    CaseClause,
    DefaultClause,
    TryStatement,
    CatchClause,
    ExceptionFilter,
    FinallyClause,
    ThrowStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    LabelledStatement,
    WithStatement,
    DefaultXmlNamespaceStatement,

    // Expressions
    EmptyExpression,
    Identifier,
    XmlAttributeIdentifier,
    AsteriskExpression,
    DecimalLiteral,
    StringLiteral,
    RegExpLiteral,
    BooleanLiteral,
    NullExpression,
    ThisExpression,
    BinaryOperation,
    UnaryOperation,
    DeleteExpression,
    TypeOfExpression,
    VoidExpression,
    YieldExpression,
    NewExpression,
    CallExpression,
    PropertyExpression,
    GetAllChildrenExpression,
    GetLocalNameExpression,
    GetArrayItemExpression,
    ArrayInitializer,
    ObjectInitializer,
    PropertyInitializer,
    GetMethod,
    SetMethod,
    ConditionalExpression,
    CommaExpression,
    ParenthesizedExpression,
    VariableDeclaration,
    VariableDeclarator,
    XmlLiteral,
    XmlTextFragment,
    XmlExpressionFragment,

    /// Function declarations and function expressions.
    Function,

    // Decorations
    Keyword,
    Label,
    Comment,
}

impl NodeKind {
    /// Expression kinds without a meaningful inner structure. A cursor
    /// query landing inside one of these resolves to it directly.
    pub fn is_atomic_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::BooleanLiteral
                | NodeKind::NullExpression
                | NodeKind::DecimalLiteral
                | NodeKind::RegExpLiteral
                | NodeKind::StringLiteral
                | NodeKind::ThisExpression
                | NodeKind::Identifier
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
