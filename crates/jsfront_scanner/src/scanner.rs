//! The JavaScript scanner.
//!
//! Converts source text into a full-fidelity token list: whitespace, line
//! terminators and comments are tokens too, so concatenating the token texts
//! gives back the source. Positions are byte offsets into the UTF-8 text.
//!
//! Two pieces of context steer the scanner. The previous significant token
//! decides whether `/` starts a regular expression and whether `<` starts an
//! E4X literal. A mode stack tracks E4X literals and the `{expression}`
//! blocks embedded in them, so scanning resumes inside the literal after the
//! closing brace.

use crate::char_codes::*;
use crate::ScanOptions;
use jsfront_core::text::TextSpan;
use jsfront_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use jsfront_syntax::{SyntaxKind, Token, TokenFlags};

/// Scanner state inside an XML literal. Survives across embedded expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct XmlState {
    /// Number of open elements.
    depth: u32,
    /// Inside `<name ...>` or `</name>`.
    in_tag: bool,
    /// The current tag is a closing tag.
    closing: bool,
    /// Inside a quoted attribute value.
    quote: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    Xml(XmlState),
    Embedded { brace_depth: u32 },
}

/// Why a run of XML text stopped.
enum XmlStop {
    Done,
    Embedded,
    Eof,
}

/// The scanner converts JavaScript source text into tokens.
pub struct Scanner<'a> {
    /// The source text being scanned.
    text: &'a str,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token.
    token_start: usize,
    /// Flags for the current token.
    token_flags: TokenFlags,
    /// 1-based line of the current token start.
    line: u32,
    /// Byte offset where the current line starts.
    line_start: usize,
    modes: Vec<LexMode>,
    /// Kind of the last non-hidden token.
    prev_significant: Option<SyntaxKind>,
    /// A line terminator was seen since the last significant token.
    saw_line_break: bool,
    /// Error to attach to the current token once its extent is known.
    pending_error: Option<&'static DiagnosticMessage>,
    options: ScanOptions,
    diagnostics: DiagnosticCollection,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'a str, options: ScanOptions) -> Self {
        Self {
            text,
            pos: 0,
            token_start: 0,
            token_flags: TokenFlags::NONE,
            line: 1,
            line_start: 0,
            modes: Vec::new(),
            prev_significant: None,
            saw_line_break: false,
            pending_error: None,
            options,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Scan the whole text.
    pub fn scan_all(mut self) -> (Vec<Token>, DiagnosticCollection) {
        let mut tokens = Vec::new();
        while let Some(kind) = self.scan() {
            self.push_token(kind, &mut tokens);
        }
        if self.modes.iter().any(|m| matches!(m, LexMode::Xml(_))) {
            let pos = self.pos;
            self.report_at(pos, 0, &messages::UNTERMINATED_XML_LITERAL);
        }
        (tokens, self.diagnostics)
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Get the start position of the current token.
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Look at the character `offset` characters past the current one.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset)
    }

    #[inline]
    fn starts_with(&self, s: &str) -> bool {
        self.text[self.pos..].starts_with(s)
    }

    #[inline]
    fn advance_char(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn regex_allowed(&self) -> bool {
        !self.prev_significant.map_or(false, SyntaxKind::ends_operand)
    }

    fn report_at(&mut self, start: usize, len: usize, message: &DiagnosticMessage) {
        let span = TextSpan::new(start as u32, len as u32);
        self.diagnostics
            .add(Diagnostic::with_location(span, self.line - 1, message, &[]));
    }

    fn push_token(&mut self, kind: SyntaxKind, tokens: &mut Vec<Token>) {
        let source = self.text;
        let text = &source[self.token_start..self.pos];
        let column = (self.token_start - self.line_start) as u32;
        let mut flags = self.token_flags;
        if kind.is_hidden() {
            if kind == SyntaxKind::Eol
                || (kind == SyntaxKind::MultiLineComment && contains_line_break(text))
            {
                self.saw_line_break = true;
            }
        } else {
            if self.saw_line_break {
                flags |= TokenFlags::PRECEDING_LINE_BREAK;
                self.saw_line_break = false;
            }
            self.prev_significant = Some(kind);
        }
        if let Some(message) = self.pending_error.take() {
            self.report_at(self.token_start, text.len(), message);
        }
        tokens.push(Token::new(kind, text, self.line, column, tokens.len()).with_flags(flags));
        self.advance_lines(self.token_start, self.pos);
    }

    /// Move the line counter past `[start, end)`. `\n`, `\r\n` and a lone `\r`
    /// each end a line, matching the line tracker.
    fn advance_lines(&mut self, start: usize, end: usize) {
        let text = self.text;
        let bytes = text.as_bytes();
        for i in memchr::memchr2_iter(b'\n', b'\r', &bytes[start..end]) {
            let at = start + i;
            if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
                continue;
            }
            self.line += 1;
            self.line_start = at + 1;
        }
    }

    /// Scan the next token and return its kind, or `None` at end of input.
    pub fn scan(&mut self) -> Option<SyntaxKind> {
        self.token_flags = TokenFlags::NONE;
        self.token_start = self.pos;

        if matches!(self.modes.last(), Some(LexMode::Xml(_))) {
            if let Some(kind) = self.scan_xml() {
                return Some(kind);
            }
        }

        let ch = self.current_char()?;
        let kind = match ch {
            '\n' | '\u{2028}' | '\u{2029}' => { self.advance_char(ch); SyntaxKind::Eol }
            '\r' => {
                self.pos += 1;
                if self.current_char() == Some('\n') {
                    self.pos += 1;
                }
                SyntaxKind::Eol
            }
            c if is_white_space_single_line(c) => self.scan_white_space(),

            '(' => { self.pos += 1; SyntaxKind::OpenParenToken }
            ')' => { self.pos += 1; SyntaxKind::CloseParenToken }
            '[' => { self.pos += 1; SyntaxKind::OpenBracketToken }
            ']' => { self.pos += 1; SyntaxKind::CloseBracketToken }
            ';' => { self.pos += 1; SyntaxKind::SemicolonToken }
            ',' => { self.pos += 1; SyntaxKind::CommaToken }
            '~' => { self.pos += 1; SyntaxKind::TildeToken }
            '?' => { self.pos += 1; SyntaxKind::QuestionToken }
            '{' => self.scan_open_brace(),
            '}' => self.scan_close_brace(),

            '.' => self.scan_dot(),
            ':' => self.scan_colon(),
            '/' => self.scan_slash(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equals(),
            '!' => self.scan_exclamation(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_with_equals(SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken),
            '%' => self.scan_with_equals(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            '^' => self.scan_with_equals(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            '&' => self.scan_doubled(
                '&',
                SyntaxKind::AmpersandToken,
                SyntaxKind::AmpersandEqualsToken,
                SyntaxKind::AmpersandAmpersandToken,
            ),
            '|' => self.scan_doubled(
                '|',
                SyntaxKind::BarToken,
                SyntaxKind::BarEqualsToken,
                SyntaxKind::BarBarToken,
            ),

            '\'' | '"' => self.scan_string_literal(ch),
            '@' => self.scan_xml_attribute(),

            '0'..='9' => self.scan_number(),

            '\\' if self.char_at(1) == Some('u') => self.scan_identifier(),
            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                self.advance_char(ch);
                self.pending_error = Some(&messages::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        };
        Some(kind)
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    fn scan_white_space(&mut self) -> SyntaxKind {
        while let Some(ch) = self.current_char() {
            if !is_white_space_single_line(ch) {
                break;
            }
            self.advance_char(ch);
        }
        SyntaxKind::WhiteSpace
    }

    fn scan_open_brace(&mut self) -> SyntaxKind {
        self.pos += 1;
        if let Some(LexMode::Embedded { brace_depth }) = self.modes.last_mut() {
            *brace_depth += 1;
        }
        SyntaxKind::OpenBraceToken
    }

    fn scan_close_brace(&mut self) -> SyntaxKind {
        self.pos += 1;
        let mut closes_embedded = false;
        if let Some(LexMode::Embedded { brace_depth }) = self.modes.last_mut() {
            *brace_depth = brace_depth.saturating_sub(1);
            closes_embedded = *brace_depth == 0;
        }
        if closes_embedded {
            self.modes.pop();
        }
        SyntaxKind::CloseBraceToken
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some(c) if is_digit(c) => self.scan_number(),
            Some('.') => {
                self.pos += 2;
                SyntaxKind::DotDotToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::DotToken
            }
        }
    }

    fn scan_colon(&mut self) -> SyntaxKind {
        if self.char_at(1) == Some(':') {
            self.pos += 2;
            SyntaxKind::ColonColonToken
        } else {
            self.pos += 1;
            SyntaxKind::ColonToken
        }
    }

    fn scan_slash(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('/') => self.scan_single_line_comment(),
            Some('*') => self.scan_multi_line_comment(),
            _ if self.regex_allowed() => self.scan_regular_expression(),
            Some('=') => {
                self.pos += 2;
                SyntaxKind::SlashEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::SlashToken
            }
        }
    }

    fn scan_single_line_comment(&mut self) -> SyntaxKind {
        let text = self.text;
        let bytes = text.as_bytes();
        let body = self.pos + 2;
        // U+2028 and U+2029 both start with 0xE2.
        let mut end = self.text.len();
        for i in memchr::memchr3_iter(b'\n', b'\r', 0xE2, &bytes[body..]) {
            let at = body + i;
            if bytes[at] != 0xE2 || text[at..].starts_with(['\u{2028}', '\u{2029}']) {
                end = at;
                break;
            }
        }
        self.pos = end;
        SyntaxKind::SingleLineComment
    }

    fn scan_multi_line_comment(&mut self) -> SyntaxKind {
        if !self.skip_past(2, "*/") {
            self.token_flags |= TokenFlags::UNTERMINATED;
            self.pending_error = Some(&messages::UNTERMINATED_COMMENT);
        }
        SyntaxKind::MultiLineComment
    }

    /// Move past `skip` bytes and then past the next `terminator`. At end of
    /// input without a terminator, stop there and return false.
    fn skip_past(&mut self, skip: usize, terminator: &str) -> bool {
        let from = (self.pos + skip).min(self.text.len());
        match memchr::memmem::find(&self.text.as_bytes()[from..], terminator.as_bytes()) {
            Some(i) => {
                self.pos = from + i + terminator.len();
                true
            }
            None => {
                self.pos = self.text.len();
                false
            }
        }
    }

    fn scan_regular_expression(&mut self) -> SyntaxKind {
        self.pos += 1;
        let mut in_character_class = false;
        loop {
            let Some(ch) = self.current_char() else {
                self.unterminated(&messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL);
                break;
            };
            if is_line_break(ch) {
                self.unterminated(&messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL);
                break;
            }
            if ch == '\\' {
                self.pos += 1;
                if let Some(next) = self.current_char().filter(|c| !is_line_break(*c)) {
                    self.advance_char(next);
                }
                continue;
            }
            if ch == '[' {
                in_character_class = true;
            } else if ch == ']' {
                in_character_class = false;
            } else if ch == '/' && !in_character_class {
                self.pos += 1;
                while let Some(flag) = self.current_char().filter(|c| is_identifier_part(*c)) {
                    self.advance_char(flag);
                }
                break;
            }
            self.advance_char(ch);
        }
        SyntaxKind::RegularExpressionLiteral
    }

    fn unterminated(&mut self, message: &'static DiagnosticMessage) {
        self.token_flags |= TokenFlags::UNTERMINATED;
        self.pending_error = Some(message);
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        if self.options.xml_literals && self.regex_allowed() && self.starts_xml_literal() {
            self.modes.push(LexMode::Xml(XmlState::default()));
            if let Some(kind) = self.scan_xml() {
                return kind;
            }
        }
        match (self.char_at(1), self.char_at(2)) {
            (Some('<'), Some('=')) => { self.pos += 3; SyntaxKind::LessThanLessThanEqualsToken }
            (Some('<'), _) => { self.pos += 2; SyntaxKind::LessThanLessThanToken }
            (Some('='), _) => { self.pos += 2; SyntaxKind::LessThanEqualsToken }
            _ => { self.pos += 1; SyntaxKind::LessThanToken }
        }
    }

    fn starts_xml_literal(&self) -> bool {
        matches!(self.char_at(1), Some(c) if is_identifier_start(c) || matches!(c, '>' | '!' | '?'))
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        if self.starts_with(">>>=") {
            self.pos += 4;
            SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
        } else if self.starts_with(">>>") {
            self.pos += 3;
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken
        } else if self.starts_with(">>=") {
            self.pos += 3;
            SyntaxKind::GreaterThanGreaterThanEqualsToken
        } else if self.starts_with(">>") {
            self.pos += 2;
            SyntaxKind::GreaterThanGreaterThanToken
        } else if self.starts_with(">=") {
            self.pos += 2;
            SyntaxKind::GreaterThanEqualsToken
        } else {
            self.pos += 1;
            SyntaxKind::GreaterThanToken
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        if self.starts_with("===") {
            self.pos += 3;
            SyntaxKind::EqualsEqualsEqualsToken
        } else if self.starts_with("==") {
            self.pos += 2;
            SyntaxKind::EqualsEqualsToken
        } else {
            self.pos += 1;
            SyntaxKind::EqualsToken
        }
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        if self.starts_with("!==") {
            self.pos += 3;
            SyntaxKind::ExclamationEqualsEqualsToken
        } else if self.starts_with("!=") {
            self.pos += 2;
            SyntaxKind::ExclamationEqualsToken
        } else {
            self.pos += 1;
            SyntaxKind::ExclamationToken
        }
    }

    fn scan_plus(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('+') => { self.pos += 2; SyntaxKind::PlusPlusToken }
            Some('=') => { self.pos += 2; SyntaxKind::PlusEqualsToken }
            _ => { self.pos += 1; SyntaxKind::PlusToken }
        }
    }

    fn scan_minus(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('-') => { self.pos += 2; SyntaxKind::MinusMinusToken }
            Some('=') => { self.pos += 2; SyntaxKind::MinusEqualsToken }
            _ => { self.pos += 1; SyntaxKind::MinusToken }
        }
    }

    /// `x` or `x=`.
    fn scan_with_equals(&mut self, single: SyntaxKind, assign: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some('=') {
            self.pos += 2;
            assign
        } else {
            self.pos += 1;
            single
        }
    }

    /// `x`, `x=` or `xx`.
    fn scan_doubled(
        &mut self,
        ch: char,
        single: SyntaxKind,
        assign: SyntaxKind,
        doubled: SyntaxKind,
    ) -> SyntaxKind {
        if self.char_at(1) == Some(ch) {
            self.pos += 2;
            doubled
        } else {
            self.scan_with_equals(single, assign)
        }
    }

    fn scan_string_literal(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1; // skip opening quote
        loop {
            let Some(ch) = self.current_char() else {
                self.unterminated(&messages::UNTERMINATED_STRING_LITERAL);
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\\' {
                self.pos += 1;
                match self.current_char() {
                    // Line continuation
                    Some('\r') => {
                        self.pos += 1;
                        if self.current_char() == Some('\n') {
                            self.pos += 1;
                        }
                    }
                    Some(escaped) => self.advance_char(escaped),
                    None => {}
                }
                continue;
            }
            if is_line_break(ch) {
                self.unterminated(&messages::UNTERMINATED_STRING_LITERAL);
                break;
            }
            self.advance_char(ch);
        }
        SyntaxKind::StringLiteral
    }

    fn scan_number(&mut self) -> SyntaxKind {
        if self.current_char() == Some('0') {
            match self.char_at(1) {
                Some('x') | Some('X') => {
                    self.pos += 2;
                    while let Some(c) = self.current_char().filter(|c| is_hex_digit(*c)) {
                        self.advance_char(c);
                    }
                    return SyntaxKind::HexIntegerLiteral;
                }
                Some(c) if is_octal_digit(c) => {
                    let save = self.pos;
                    self.pos += 1;
                    while let Some(c) = self.current_char().filter(|c| is_octal_digit(*c)) {
                        self.advance_char(c);
                    }
                    // A stray 8, 9, fraction or exponent makes it decimal.
                    if !matches!(self.current_char(), Some('8' | '9' | '.' | 'e' | 'E')) {
                        return SyntaxKind::OctalIntegerLiteral;
                    }
                    self.pos = save;
                }
                _ => {}
            }
        }

        self.scan_digits();
        if self.current_char() == Some('.') {
            self.pos += 1;
            self.scan_digits();
        }
        if let Some('e') | Some('E') = self.current_char() {
            let exponent_digits = match self.char_at(1) {
                Some('+') | Some('-') => self.char_at(2).map_or(false, is_digit),
                Some(c) => is_digit(c),
                None => false,
            };
            if exponent_digits {
                self.pos += 1;
                if let Some('+') | Some('-') = self.current_char() {
                    self.pos += 1;
                }
                self.scan_digits();
            }
        }
        SyntaxKind::DecimalLiteral
    }

    fn scan_digits(&mut self) {
        while let Some(c) = self.current_char().filter(|c| is_digit(*c)) {
            self.advance_char(c);
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.scan_identifier_parts();
        SyntaxKind::from_keyword(&self.text[start..self.pos]).unwrap_or(SyntaxKind::Identifier)
    }

    /// Consume identifier characters, including `\uXXXX` escapes.
    fn scan_identifier_parts(&mut self) {
        while let Some(ch) = self.current_char() {
            if is_identifier_part(ch) {
                self.advance_char(ch);
            } else if ch == '\\' && self.char_at(1) == Some('u') {
                self.pos += 2;
                for _ in 0..4 {
                    match self.current_char() {
                        Some(c) if is_hex_digit(c) => self.pos += 1,
                        _ => break,
                    }
                }
            } else {
                break;
            }
        }
    }

    /// `@name` or `@*`. A bare `@` is an invalid character.
    fn scan_xml_attribute(&mut self) -> SyntaxKind {
        self.pos += 1;
        match self.current_char() {
            Some('*') => {
                self.pos += 1;
                SyntaxKind::XmlAttribute
            }
            Some(c) if is_identifier_start(c) => {
                self.scan_identifier_parts();
                SyntaxKind::XmlAttribute
            }
            _ => {
                self.pending_error = Some(&messages::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        }
    }

    // ========================================================================
    // E4X literals
    // ========================================================================

    /// Scan XML text up to the next embedded `{`, or to the end of the literal.
    ///
    /// Returns `None` when the literal continues with `{` right away, in which
    /// case the brace is scanned as an ordinary token.
    fn scan_xml(&mut self) -> Option<SyntaxKind> {
        let Some(LexMode::Xml(mut state)) = self.modes.last().copied() else {
            return None;
        };
        let start = self.pos;

        let stop = loop {
            let Some(ch) = self.current_char() else {
                break XmlStop::Eof;
            };
            if let Some(quote) = state.quote {
                if ch == quote {
                    state.quote = None;
                }
                self.advance_char(ch);
                continue;
            }
            if ch == '{' {
                break XmlStop::Embedded;
            }
            if state.in_tag {
                match ch {
                    '"' | '\'' => {
                        state.quote = Some(ch);
                        self.pos += 1;
                    }
                    '/' if self.char_at(1) == Some('>') => {
                        self.pos += 2;
                        state.in_tag = false;
                        state.depth = state.depth.saturating_sub(1);
                        if state.depth == 0 {
                            break XmlStop::Done;
                        }
                    }
                    '>' => {
                        self.pos += 1;
                        state.in_tag = false;
                        if state.closing {
                            state.depth = state.depth.saturating_sub(1);
                            if state.depth == 0 {
                                break XmlStop::Done;
                            }
                        }
                    }
                    _ => self.advance_char(ch),
                }
            } else if ch == '<' {
                let markup = if self.starts_with("<!--") {
                    Some((4, "-->"))
                } else if self.starts_with("<![CDATA[") {
                    Some((9, "]]>"))
                } else if self.starts_with("<?") {
                    Some((2, "?>"))
                } else {
                    None
                };
                match markup {
                    Some((skip, terminator)) => {
                        if !self.skip_past(skip, terminator) {
                            break XmlStop::Eof;
                        }
                        if state.depth == 0 {
                            break XmlStop::Done;
                        }
                    }
                    None if self.char_at(1) == Some('/') => {
                        self.pos += 2;
                        state.in_tag = true;
                        state.closing = true;
                    }
                    None => {
                        self.pos += 1;
                        state.in_tag = true;
                        state.closing = false;
                        state.depth += 1;
                    }
                }
            } else {
                self.advance_char(ch);
            }
        };

        match stop {
            XmlStop::Done => {
                self.modes.pop();
                Some(SyntaxKind::XmlFragmentEnd)
            }
            XmlStop::Embedded => {
                if let Some(LexMode::Xml(saved)) = self.modes.last_mut() {
                    *saved = state;
                }
                self.modes.push(LexMode::Embedded { brace_depth: 0 });
                (self.pos > start).then_some(SyntaxKind::XmlFragment)
            }
            XmlStop::Eof => {
                self.modes.pop();
                if self.pos > start {
                    self.unterminated(&messages::UNTERMINATED_XML_LITERAL);
                    Some(SyntaxKind::XmlFragmentEnd)
                } else {
                    self.report_at(start, 0, &messages::UNTERMINATED_XML_LITERAL);
                    None
                }
            }
        }
    }
}

fn contains_line_break(text: &str) -> bool {
    memchr::memchr2(b'\n', b'\r', text.as_bytes()).is_some()
        || text.contains(['\u{2028}', '\u{2029}'])
}
