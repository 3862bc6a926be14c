//! AST node definitions.
//!
//! Statements and expressions are closed enums over plain structs. Child
//! nodes are owned; recursion goes through `Box`. Punctuation offsets are
//! `Option` wherever error recovery may have synthesized the token.

use jsfront_core::text::{TextPos, TextRange};
use jsfront_syntax::SyntaxKind;

// ============================================================================
// Decorations
// ============================================================================

/// A keyword occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub range: TextRange,
    /// The keyword's token kind.
    pub token: SyntaxKind,
}

impl Keyword {
    pub fn new(range: TextRange, token: SyntaxKind) -> Self {
        Self { range, token }
    }

    /// The keyword as written.
    pub fn text(&self) -> &'static str {
        self.token.keyword_text().unwrap_or("")
    }
}

/// A statement label, at its definition or in `break`/`continue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub range: TextRange,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    SingleLine,
    MultiLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub range: TextRange,
    pub text: String,
    pub kind: CommentKind,
}

// ============================================================================
// Script
// ============================================================================

/// The root of a parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    pub range: TextRange,
    pub statements: Vec<Statement>,
    /// Every comment of the source, in source order.
    pub comments: Vec<Comment>,
}

impl Script {
    /// A script with no content spanning `[0, len)`.
    pub fn empty(len: TextPos) -> Self {
        Self {
            range: TextRange::new(0, len),
            statements: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.comments.is_empty()
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Block(Block),
    Empty(EmptyStatement),
    Expression(ExpressionStatement),
    Const(ConstStatement),
    If(IfStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(ForStatement),
    /// `for (… in …)` and `for each (… in …)`.
    ForIn(ForInStatement),
    Switch(SwitchStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
    Return(ReturnStatement),
    /// `break` and `continue`.
    Jump(JumpStatement),
    Labelled(LabelledStatement),
    With(WithStatement),
    Function(Function),
    DefaultXmlNamespace(DefaultXmlNamespaceStatement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub range: TextRange,
    pub lc: Option<TextPos>,
    pub statements: Vec<Statement>,
    pub rc: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyStatement {
    pub range: TextRange,
}

/// An expression in statement position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionStatement {
    pub range: TextRange,
    pub expression: Expression,
    pub semicolon: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstStatement {
    pub range: TextRange,
    pub const_keyword: Keyword,
    pub declarations: Vec<VariableDeclarator>,
    pub commas: Vec<TextPos>,
    pub semicolon: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement {
    pub range: TextRange,
    pub if_keyword: Keyword,
    pub lp: Option<TextPos>,
    pub condition: Expression,
    pub rp: Option<TextPos>,
    pub then_statement: Box<Statement>,
    pub else_keyword: Option<Keyword>,
    pub else_statement: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStatement {
    pub range: TextRange,
    pub while_keyword: Keyword,
    pub lp: Option<TextPos>,
    pub condition: Expression,
    pub rp: Option<TextPos>,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoWhileStatement {
    pub range: TextRange,
    pub do_keyword: Keyword,
    pub body: Box<Statement>,
    pub while_keyword: Option<Keyword>,
    pub lp: Option<TextPos>,
    pub condition: Expression,
    pub rp: Option<TextPos>,
    pub semicolon: Option<TextPos>,
}

/// `for (initial; condition; step) body`. Omitted clauses are empty
/// expressions positioned at the token that follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStatement {
    pub range: TextRange,
    pub for_keyword: Keyword,
    pub lp: Option<TextPos>,
    pub initial: Expression,
    pub initial_semicolon: Option<TextPos>,
    pub condition: Expression,
    pub condition_semicolon: Option<TextPos>,
    pub step: Expression,
    pub rp: Option<TextPos>,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForInStatement {
    pub range: TextRange,
    pub for_keyword: Keyword,
    /// Present for `for each`.
    pub each_keyword: Option<Keyword>,
    pub lp: Option<TextPos>,
    pub item: Expression,
    pub in_keyword: Keyword,
    pub iterator: Expression,
    pub rp: Option<TextPos>,
    pub body: Box<Statement>,
}

impl ForInStatement {
    pub fn is_for_each(&self) -> bool {
        self.each_keyword.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchStatement {
    pub range: TextRange,
    pub switch_keyword: Keyword,
    pub lp: Option<TextPos>,
    pub condition: Expression,
    pub rp: Option<TextPos>,
    pub lc: Option<TextPos>,
    /// Clauses in source order.
    pub clauses: Vec<SwitchClause>,
    pub rc: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchClause {
    Case(CaseClause),
    Default(DefaultClause),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    pub range: TextRange,
    pub case_keyword: Keyword,
    pub condition: Expression,
    pub colon: Option<TextPos>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultClause {
    pub range: TextRange,
    pub default_keyword: Keyword,
    pub colon: Option<TextPos>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryStatement {
    pub range: TextRange,
    pub try_keyword: Keyword,
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<FinallyClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchClause {
    pub range: TextRange,
    pub catch_keyword: Keyword,
    pub lp: Option<TextPos>,
    pub exception: Identifier,
    pub filter: Option<ExceptionFilter>,
    pub rp: Option<TextPos>,
    pub body: Block,
}

/// The `if condition` part of `catch (e if condition)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionFilter {
    pub range: TextRange,
    pub if_keyword: Keyword,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinallyClause {
    pub range: TextRange,
    pub finally_keyword: Keyword,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowStatement {
    pub range: TextRange,
    pub throw_keyword: Keyword,
    pub exception: Expression,
    pub semicolon: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub range: TextRange,
    pub return_keyword: Keyword,
    pub value: Option<Expression>,
    pub semicolon: Option<TextPos>,
}

/// `break` or `continue`, told apart by the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpStatement {
    pub range: TextRange,
    pub keyword: Keyword,
    pub label: Option<Label>,
    pub semicolon: Option<TextPos>,
}

impl JumpStatement {
    pub fn is_break(&self) -> bool {
        self.keyword.token == SyntaxKind::BreakKeyword
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledStatement {
    pub range: TextRange,
    pub label: Label,
    pub colon: Option<TextPos>,
    pub statement: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithStatement {
    pub range: TextRange,
    pub with_keyword: Keyword,
    pub lp: Option<TextPos>,
    pub expression: Expression,
    pub rp: Option<TextPos>,
    pub statement: Box<Statement>,
}

/// `default xml namespace = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultXmlNamespaceStatement {
    pub range: TextRange,
    pub default_keyword: Keyword,
    pub xml_keyword: Keyword,
    pub namespace_keyword: Option<Keyword>,
    pub assign: Option<TextPos>,
    pub value: Expression,
    pub semicolon: Option<TextPos>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// An omitted or unparseable expression; zero width.
    Empty(EmptyExpression),
    Identifier(Identifier),
    XmlAttribute(XmlAttributeIdentifier),
    Asterisk(AsteriskExpression),
    Literal(Literal),
    Null(NullExpression),
    This(ThisExpression),
    Binary(BinaryOperation),
    Unary(UnaryOperation),
    /// `delete`, `typeof`, `void` and `yield`.
    KeywordOperation(KeywordOperation),
    New(NewExpression),
    Call(CallExpression),
    Property(PropertyExpression),
    GetAllChildren(GetAllChildrenExpression),
    GetLocalName(GetLocalNameExpression),
    ArrayItem(GetArrayItemExpression),
    Array(ArrayInitializer),
    Object(ObjectInitializer),
    Conditional(ConditionalExpression),
    Comma(CommaExpression),
    Parenthesized(ParenthesizedExpression),
    Function(Function),
    Variable(VariableDeclaration),
    Xml(XmlLiteral),
}

impl Expression {
    pub fn empty_at(pos: TextPos) -> Self {
        Expression::Empty(EmptyExpression {
            range: TextRange::empty(pos),
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Expression::Empty(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyExpression {
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub range: TextRange,
    pub name: String,
}

/// `@name` or `@*` in E4X.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttributeIdentifier {
    pub range: TextRange,
    pub name: String,
}

/// The E4X wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsteriskExpression {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Decimal, hexadecimal and octal numbers.
    Decimal,
    String,
    RegExp,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub range: TextRange,
    pub kind: LiteralKind,
    /// The literal as written, quotes and slashes included.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullExpression {
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThisExpression {
    pub range: TextRange,
    pub this_keyword: Keyword,
}

/// Binary operators, assignments included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOperation {
    pub range: TextRange,
    pub operator: SyntaxKind,
    pub operator_position: TextPos,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl BinaryOperation {
    pub fn operator_text(&self) -> &'static str {
        self.operator.text().unwrap_or("")
    }
}

/// Prefix and postfix operators written with punctuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryOperation {
    pub range: TextRange,
    /// `PostIncrement`, `PostDecrement`, `UnaryPlus`, `UnaryMinus`, or the
    /// token kind of any other prefix operator.
    pub operator: SyntaxKind,
    pub operator_position: TextPos,
    pub expression: Box<Expression>,
}

impl UnaryOperation {
    pub fn is_postfix(&self) -> bool {
        matches!(
            self.operator,
            SyntaxKind::PostIncrement | SyntaxKind::PostDecrement
        )
    }
}

/// An operator spelled as a keyword. A `yield` without operand carries an
/// empty expression at the keyword's end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordOperation {
    pub range: TextRange,
    pub keyword: Keyword,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpression {
    pub range: TextRange,
    pub new_keyword: Keyword,
    pub object_class: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpression {
    pub range: TextRange,
    pub expression: Box<Expression>,
    pub lp: Option<TextPos>,
    pub arguments: Vec<Expression>,
    /// `commas[i]` separates `arguments[i]` and `arguments[i + 1]`.
    pub commas: Vec<TextPos>,
    pub rp: Option<TextPos>,
}

/// `object.property`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyExpression {
    pub range: TextRange,
    pub object: Box<Expression>,
    pub dot: TextPos,
    pub property: Box<Expression>,
}

/// `object..property`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAllChildrenExpression {
    pub range: TextRange,
    pub object: Box<Expression>,
    pub dot_dot: TextPos,
    pub property: Box<Expression>,
}

/// `namespace::name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetLocalNameExpression {
    pub range: TextRange,
    pub namespace: Box<Expression>,
    pub colon_colon: TextPos,
    pub local_name: Box<Expression>,
}

/// `array[index]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetArrayItemExpression {
    pub range: TextRange,
    pub array: Box<Expression>,
    pub lb: Option<TextPos>,
    pub index: Box<Expression>,
    pub rb: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInitializer {
    pub range: TextRange,
    pub lb: TextPos,
    /// Holes are empty expressions positioned at their comma.
    pub items: Vec<Expression>,
    pub commas: Vec<TextPos>,
    pub rb: Option<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInitializer {
    pub range: TextRange,
    pub lc: TextPos,
    pub initializers: Vec<ObjectMember>,
    pub commas: Vec<TextPos>,
    pub rc: Option<TextPos>,
    /// The braces are on different lines.
    pub multiline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectMember {
    Property(PropertyInitializer),
    Get(GetMethod),
    Set(SetMethod),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInitializer {
    pub range: TextRange,
    pub name: Expression,
    pub colon: Option<TextPos>,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMethod {
    pub range: TextRange,
    pub get_keyword: Keyword,
    pub name: Expression,
    pub lp: Option<TextPos>,
    pub rp: Option<TextPos>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMethod {
    pub range: TextRange,
    pub set_keyword: Keyword,
    pub name: Expression,
    pub lp: Option<TextPos>,
    pub argument: Identifier,
    pub rp: Option<TextPos>,
    pub body: Block,
}

/// `condition ? true_value : false_value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExpression {
    pub range: TextRange,
    pub condition: Box<Expression>,
    pub question: TextPos,
    pub true_value: Box<Expression>,
    pub colon: Option<TextPos>,
    pub false_value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommaExpression {
    pub range: TextRange,
    pub items: Vec<Expression>,
    pub commas: Vec<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenthesizedExpression {
    pub range: TextRange,
    pub lp: TextPos,
    pub expression: Box<Expression>,
    pub rp: Option<TextPos>,
}

/// A function declaration or function expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub range: TextRange,
    pub function_keyword: Keyword,
    pub name: Option<Identifier>,
    pub lp: Option<TextPos>,
    pub arguments: Vec<Identifier>,
    pub commas: Vec<TextPos>,
    pub rp: Option<TextPos>,
    pub body: Block,
}

/// `var a = 1, b` without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub range: TextRange,
    pub var_keyword: Keyword,
    pub declarations: Vec<VariableDeclarator>,
    pub commas: Vec<TextPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclarator {
    pub range: TextRange,
    pub name: Identifier,
    pub assign: Option<TextPos>,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlLiteral {
    pub range: TextRange,
    /// Fragments in source order.
    pub fragments: Vec<XmlFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlFragment {
    Text(XmlTextFragment),
    Expression(XmlExpressionFragment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTextFragment {
    pub range: TextRange,
    pub xml: String,
}

/// An embedded `{expression}`; the range is the expression's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlExpressionFragment {
    pub range: TextRange,
    pub expression: Expression,
}
