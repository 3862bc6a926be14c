//! SyntaxKind enum - every token kind and every grammar rule tag.
//!
//! Token kinds come first, grouped so that range checks work on the
//! discriminant. Rule tags mark CST nodes that have no token of their own
//! (a call, an argument list, a postfix increment, ...).

/// The kind of a token or of a concrete syntax tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown = 0,
    /// Lookahead sentinel past the last token. Never stored in a token list.
    EndOfFileToken = 1,

    // Hidden channel
    WhiteSpace = 2,
    Eol = 3,
    SingleLineComment = 4,
    MultiLineComment = 5,

    // Literals
    DecimalLiteral = 6,
    HexIntegerLiteral = 7,
    OctalIntegerLiteral = 8,
    StringLiteral = 9,
    RegularExpressionLiteral = 10,
    XmlFragment = 11,
    XmlFragmentEnd = 12,
    XmlAttribute = 13,

    Identifier = 14,

    // Punctuation
    OpenBraceToken = 15,
    CloseBraceToken = 16,
    OpenParenToken = 17,
    CloseParenToken = 18,
    OpenBracketToken = 19,
    CloseBracketToken = 20,
    DotToken = 21,
    DotDotToken = 22,
    SemicolonToken = 23,
    CommaToken = 24,
    LessThanToken = 25,
    GreaterThanToken = 26,
    LessThanEqualsToken = 27,
    GreaterThanEqualsToken = 28,
    EqualsEqualsToken = 29,
    ExclamationEqualsToken = 30,
    EqualsEqualsEqualsToken = 31,
    ExclamationEqualsEqualsToken = 32,
    PlusToken = 33,
    MinusToken = 34,
    AsteriskToken = 35,
    SlashToken = 36,
    PercentToken = 37,
    PlusPlusToken = 38,
    MinusMinusToken = 39,
    LessThanLessThanToken = 40,
    GreaterThanGreaterThanToken = 41,
    GreaterThanGreaterThanGreaterThanToken = 42,
    AmpersandToken = 43,
    BarToken = 44,
    CaretToken = 45,
    ExclamationToken = 46,
    TildeToken = 47,
    AmpersandAmpersandToken = 48,
    BarBarToken = 49,
    QuestionToken = 50,
    ColonToken = 51,
    ColonColonToken = 52,

    // Assignment
    EqualsToken = 53,
    PlusEqualsToken = 54,
    MinusEqualsToken = 55,
    AsteriskEqualsToken = 56,
    SlashEqualsToken = 57,
    PercentEqualsToken = 58,
    LessThanLessThanEqualsToken = 59,
    GreaterThanGreaterThanEqualsToken = 60,
    GreaterThanGreaterThanGreaterThanEqualsToken = 61,
    AmpersandEqualsToken = 62,
    BarEqualsToken = 63,
    CaretEqualsToken = 64,

    // Reserved words
    BreakKeyword = 65,
    CaseKeyword = 66,
    CatchKeyword = 67,
    ConstKeyword = 68,
    ContinueKeyword = 69,
    DefaultKeyword = 70,
    DeleteKeyword = 71,
    DoKeyword = 72,
    ElseKeyword = 73,
    FalseKeyword = 74,
    FinallyKeyword = 75,
    ForKeyword = 76,
    FunctionKeyword = 77,
    IfKeyword = 78,
    InKeyword = 79,
    InstanceOfKeyword = 80,
    NewKeyword = 81,
    NullKeyword = 82,
    ReturnKeyword = 83,
    SwitchKeyword = 84,
    ThisKeyword = 85,
    ThrowKeyword = 86,
    TrueKeyword = 87,
    TryKeyword = 88,
    TypeOfKeyword = 89,
    VarKeyword = 90,
    VoidKeyword = 91,
    WhileKeyword = 92,
    WithKeyword = 93,
    YieldKeyword = 94,

    // Contextual keywords, usable as identifiers
    EachKeyword = 95,
    GetKeyword = 96,
    SetKeyword = 97,
    XmlKeyword = 98,
    NamespaceKeyword = 99,

    // ========================================================================
    // Rule tags
    // ========================================================================
    Script = 100,
    Block = 101,
    EmptyStatement = 102,
    Labelled = 103,
    Expr = 104,
    Paren = 105,
    CommaExpr = 106,
    Call = 107,
    Arguments = 108,
    ByField = 109,
    ByIndex = 110,
    ForStep = 111,
    ForIter = 112,
    ForEach = 113,
    ArrayLiteral = 114,
    Item = 115,
    ObjectLiteral = 116,
    PropertyInit = 117,
    PostIncrement = 118,
    PostDecrement = 119,
    UnaryPlus = 120,
    UnaryMinus = 121,
    XmlLiteral = 122,
    DefaultXmlNamespace = 123,
}

impl SyntaxKind {
    pub const FIRST_HIDDEN: SyntaxKind = SyntaxKind::WhiteSpace;
    pub const LAST_HIDDEN: SyntaxKind = SyntaxKind::MultiLineComment;
    pub const FIRST_LITERAL: SyntaxKind = SyntaxKind::DecimalLiteral;
    pub const LAST_LITERAL: SyntaxKind = SyntaxKind::XmlAttribute;
    pub const FIRST_ASSIGNMENT: SyntaxKind = SyntaxKind::EqualsToken;
    pub const LAST_ASSIGNMENT: SyntaxKind = SyntaxKind::CaretEqualsToken;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::NamespaceKeyword;
    pub const FIRST_CONTEXTUAL_KEYWORD: SyntaxKind = SyntaxKind::EachKeyword;
    pub const LAST_CONTEXTUAL_KEYWORD: SyntaxKind = SyntaxKind::NamespaceKeyword;
    pub const LAST_TOKEN: SyntaxKind = SyntaxKind::NamespaceKeyword;
}

impl SyntaxKind {
    #[inline]
    fn in_range(self, first: SyntaxKind, last: SyntaxKind) -> bool {
        let v = self as u16;
        v >= first as u16 && v <= last as u16
    }

    /// Whether tokens of this kind live on the hidden channel (whitespace, line
    /// terminators and comments).
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.in_range(Self::FIRST_HIDDEN, Self::LAST_HIDDEN)
    }

    /// Whether this kind is a comment token.
    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(self, SyntaxKind::SingleLineComment | SyntaxKind::MultiLineComment)
    }

    /// Whether this kind represents a literal token.
    #[inline]
    pub fn is_literal(self) -> bool {
        self.in_range(Self::FIRST_LITERAL, Self::LAST_LITERAL)
    }

    /// Whether this kind is a numeric literal token.
    #[inline]
    pub fn is_numeric_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::DecimalLiteral
                | SyntaxKind::HexIntegerLiteral
                | SyntaxKind::OctalIntegerLiteral
        )
    }

    /// Whether this kind represents an assignment operator.
    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        self.in_range(Self::FIRST_ASSIGNMENT, Self::LAST_ASSIGNMENT)
    }

    /// Whether this kind represents a keyword, reserved or contextual.
    #[inline]
    pub fn is_keyword(self) -> bool {
        self.in_range(Self::FIRST_KEYWORD, Self::LAST_KEYWORD)
    }

    /// Whether this kind is a keyword that may also serve as an identifier.
    #[inline]
    pub fn is_contextual_keyword(self) -> bool {
        self.in_range(Self::FIRST_CONTEXTUAL_KEYWORD, Self::LAST_CONTEXTUAL_KEYWORD)
    }

    /// Whether this kind is produced by the scanner.
    #[inline]
    pub fn is_token(self) -> bool {
        (self as u16) <= Self::LAST_TOKEN as u16
    }

    /// Whether a token of this kind can end an operand, so that a following
    /// `/` is division rather than the start of a regular expression.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::DecimalLiteral
                | SyntaxKind::HexIntegerLiteral
                | SyntaxKind::OctalIntegerLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::RegularExpressionLiteral
                | SyntaxKind::XmlFragmentEnd
                | SyntaxKind::XmlAttribute
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::ThisKeyword
                | SyntaxKind::NullKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
        ) || self.is_contextual_keyword()
    }

    /// Get the keyword text for a keyword kind, or None if not a keyword.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::CaseKeyword => Some("case"),
            SyntaxKind::CatchKeyword => Some("catch"),
            SyntaxKind::ConstKeyword => Some("const"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::DefaultKeyword => Some("default"),
            SyntaxKind::DeleteKeyword => Some("delete"),
            SyntaxKind::DoKeyword => Some("do"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::FinallyKeyword => Some("finally"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::FunctionKeyword => Some("function"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::InKeyword => Some("in"),
            SyntaxKind::InstanceOfKeyword => Some("instanceof"),
            SyntaxKind::NewKeyword => Some("new"),
            SyntaxKind::NullKeyword => Some("null"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::SwitchKeyword => Some("switch"),
            SyntaxKind::ThisKeyword => Some("this"),
            SyntaxKind::ThrowKeyword => Some("throw"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::TryKeyword => Some("try"),
            SyntaxKind::TypeOfKeyword => Some("typeof"),
            SyntaxKind::VarKeyword => Some("var"),
            SyntaxKind::VoidKeyword => Some("void"),
            SyntaxKind::WhileKeyword => Some("while"),
            SyntaxKind::WithKeyword => Some("with"),
            SyntaxKind::YieldKeyword => Some("yield"),
            SyntaxKind::EachKeyword => Some("each"),
            SyntaxKind::GetKeyword => Some("get"),
            SyntaxKind::SetKeyword => Some("set"),
            SyntaxKind::XmlKeyword => Some("xml"),
            SyntaxKind::NamespaceKeyword => Some("namespace"),
            _ => None,
        }
    }

    /// Look up a keyword SyntaxKind from text.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "break" => Some(SyntaxKind::BreakKeyword),
            "case" => Some(SyntaxKind::CaseKeyword),
            "catch" => Some(SyntaxKind::CatchKeyword),
            "const" => Some(SyntaxKind::ConstKeyword),
            "continue" => Some(SyntaxKind::ContinueKeyword),
            "default" => Some(SyntaxKind::DefaultKeyword),
            "delete" => Some(SyntaxKind::DeleteKeyword),
            "do" => Some(SyntaxKind::DoKeyword),
            "else" => Some(SyntaxKind::ElseKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            "finally" => Some(SyntaxKind::FinallyKeyword),
            "for" => Some(SyntaxKind::ForKeyword),
            "function" => Some(SyntaxKind::FunctionKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "in" => Some(SyntaxKind::InKeyword),
            "instanceof" => Some(SyntaxKind::InstanceOfKeyword),
            "new" => Some(SyntaxKind::NewKeyword),
            "null" => Some(SyntaxKind::NullKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "switch" => Some(SyntaxKind::SwitchKeyword),
            "this" => Some(SyntaxKind::ThisKeyword),
            "throw" => Some(SyntaxKind::ThrowKeyword),
            "true" => Some(SyntaxKind::TrueKeyword),
            "try" => Some(SyntaxKind::TryKeyword),
            "typeof" => Some(SyntaxKind::TypeOfKeyword),
            "var" => Some(SyntaxKind::VarKeyword),
            "void" => Some(SyntaxKind::VoidKeyword),
            "while" => Some(SyntaxKind::WhileKeyword),
            "with" => Some(SyntaxKind::WithKeyword),
            "yield" => Some(SyntaxKind::YieldKeyword),
            "each" => Some(SyntaxKind::EachKeyword),
            "get" => Some(SyntaxKind::GetKeyword),
            "set" => Some(SyntaxKind::SetKeyword),
            "xml" => Some(SyntaxKind::XmlKeyword),
            "namespace" => Some(SyntaxKind::NamespaceKeyword),
            _ => None,
        }
    }

    /// Get the punctuation text for a punctuation kind, or None.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::DotDotToken => Some(".."),
            SyntaxKind::SemicolonToken => Some(";"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::EqualsEqualsEqualsToken => Some("==="),
            SyntaxKind::ExclamationEqualsEqualsToken => Some("!=="),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::PlusPlusToken => Some("++"),
            SyntaxKind::MinusMinusToken => Some("--"),
            SyntaxKind::LessThanLessThanToken => Some("<<"),
            SyntaxKind::GreaterThanGreaterThanToken => Some(">>"),
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken => Some(">>>"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::BarToken => Some("|"),
            SyntaxKind::CaretToken => Some("^"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::ColonColonToken => Some("::"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::PlusEqualsToken => Some("+="),
            SyntaxKind::MinusEqualsToken => Some("-="),
            SyntaxKind::AsteriskEqualsToken => Some("*="),
            SyntaxKind::SlashEqualsToken => Some("/="),
            SyntaxKind::PercentEqualsToken => Some("%="),
            SyntaxKind::LessThanLessThanEqualsToken => Some("<<="),
            SyntaxKind::GreaterThanGreaterThanEqualsToken => Some(">>="),
            SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => Some(">>>="),
            SyntaxKind::AmpersandEqualsToken => Some("&="),
            SyntaxKind::BarEqualsToken => Some("|="),
            SyntaxKind::CaretEqualsToken => Some("^="),
            _ => None,
        }
    }

    /// Fixed source text of this kind, if tokens of this kind always spell the same.
    pub fn text(self) -> Option<&'static str> {
        self.punctuation_text().or_else(|| self.keyword_text())
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
