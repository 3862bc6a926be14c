//! The JavaScript grammar.
//!
//! A recursive descent parser over the significant tokens of a full-fidelity
//! token list. Node bounds are indices into the full list, so hidden tokens
//! between a node's first and last token stay inside its window.
//!
//! Operator and keyword productions are rooted at a node tagged with the
//! token kind (`a + b` is a `PlusToken` node with two children); the rest use
//! rule tags. An expression in statement position keeps only its own bounds;
//! the terminating `;` is consumed but left to the following token.

use crate::error::SyntaxError;
use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use jsfront_core::text::{LineMap, TextSpan};
use jsfront_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use jsfront_syntax::{CstNode, SyntaxKind, Token};
use tracing::debug;

/// Maximum nesting of statements, assignment expressions, prefix operators
/// and `new`.
/// Each level costs one pass through the expression chain, so this also
/// bounds the stack the parser needs.
pub const MAX_RECURSION_DEPTH: u32 = 200;

type ParseResult = Result<CstNode, SyntaxError>;

/// Builds a concrete syntax tree from a token list.
pub struct Grammar<'t> {
    tokens: &'t [Token],
    line_map: &'t LineMap,
    /// Indices of the significant tokens.
    significant: Vec<usize>,
    /// Position in `significant`.
    pos: usize,
    /// Index of the last consumed token.
    last: Option<usize>,
    depth: u32,
    max_depth: u32,
    diagnostics: DiagnosticCollection,
}

#[inline]
fn is_identifier(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || kind.is_contextual_keyword()
}

#[inline]
fn is_property_name(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier
        || kind.is_keyword()
        || kind == SyntaxKind::StringLiteral
        || kind.is_numeric_literal()
}

fn describe_kind(kind: SyntaxKind) -> String {
    match kind.text() {
        Some(text) => format!("'{}'", text),
        None if kind == SyntaxKind::Identifier => "identifier".to_string(),
        None => kind.to_string(),
    }
}

/// Wrap an optional expression in an `Expr` node.
fn wrap_expr(node: CstNode) -> CstNode {
    let start = node.start;
    let stop = node.real_stop();
    CstNode::new(SyntaxKind::Expr, start, stop).with_children(vec![node])
}

impl<'t> Grammar<'t> {
    pub fn new(tokens: &'t [Token], line_map: &'t LineMap) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_hidden())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            line_map,
            significant,
            pos: 0,
            last: None,
            depth: 0,
            max_depth: MAX_RECURSION_DEPTH,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Override the nesting limit.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Parse the whole token list as a script.
    pub fn parse_program(&mut self) -> ParseResult {
        let start = self.index();
        let mut statements = Vec::new();
        self.parse_statement_list(&mut statements, |_| false)?;
        debug!(
            statements = statements.len(),
            errors = self.diagnostics.error_count(),
            "built concrete syntax tree"
        );
        Ok(self.node(SyntaxKind::Script, start, statements))
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current(&self) -> SyntaxKind {
        self.peek(0)
    }

    #[inline]
    fn peek(&self, n: usize) -> SyntaxKind {
        self.significant
            .get(self.pos + n)
            .map_or(SyntaxKind::EndOfFileToken, |&i| self.tokens[i].kind)
    }

    #[inline]
    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.significant.len()
    }

    /// Index of the current token in the full list; the list length at end of input.
    #[inline]
    fn index(&self) -> usize {
        self.significant
            .get(self.pos)
            .copied()
            .unwrap_or(self.tokens.len())
    }

    fn current_token(&self) -> Option<&'t Token> {
        let tokens = self.tokens;
        self.significant.get(self.pos).map(|&i| &tokens[i])
    }

    fn has_preceding_line_break(&self) -> bool {
        self.current_token()
            .map_or(false, Token::has_preceding_line_break)
    }

    fn bump(&mut self) -> usize {
        let index = self.index();
        if !self.is_eof() {
            self.pos += 1;
            self.last = Some(index);
        }
        index
    }

    fn eat(&mut self, kind: SyntaxKind) -> Option<usize> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Consume `kind`. A single extraneous token before it is deleted;
    /// otherwise the token is reported missing and parsing goes on as if
    /// it had been there.
    fn expect(&mut self, kind: SyntaxKind) -> Option<usize> {
        if self.at(kind) {
            return Some(self.bump());
        }
        if !self.is_eof() && self.peek(1) == kind {
            let found = self.describe_current();
            self.report(&messages::UNEXPECTED_0, &[found.as_str()]);
            self.bump();
            return Some(self.bump());
        }
        self.report_expected(kind);
        None
    }

    /// Statement terminator with automatic semicolon insertion.
    fn consume_semicolon(&mut self) {
        if self.eat(SyntaxKind::SemicolonToken).is_some()
            || self.is_eof()
            || self.at(SyntaxKind::CloseBraceToken)
            || self.has_preceding_line_break()
        {
            return;
        }
        let found = self.describe_current();
        self.report(&messages::MISMATCHED_INPUT_0_1_EXPECTED, &[found.as_str(), "';'"]);
    }

    fn stop_since(&self, start: usize) -> Option<usize> {
        self.last.filter(|&last| last >= start)
    }

    /// Where a node that matched nothing goes: right after the last consumed
    /// token, so it stays inside the node being built.
    fn missing_index(&self) -> usize {
        let index = self.index();
        self.last.map_or(index, |last| (last + 1).min(index))
    }

    fn node(&self, kind: SyntaxKind, start: usize, children: Vec<CstNode>) -> CstNode {
        CstNode::new(kind, start, self.stop_since(start)).with_children(children)
    }

    fn leaf(&mut self, kind: SyntaxKind) -> CstNode {
        let index = self.bump();
        let text = self.tokens.get(index).map_or("", |t| t.text.as_str());
        CstNode::leaf(kind, index, text)
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let limit = self.max_depth.to_string();
            self.report(&messages::NESTING_EXCEEDS_0_LEVELS, &[limit.as_str()]);
            return Err(SyntaxError::TooDeep {
                limit: self.max_depth,
                index: self.index(),
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn describe_current(&self) -> String {
        self.current_token()
            .map_or_else(|| "<EOF>".to_string(), Token::quoted)
    }

    /// Report at the current token, or at the last significant token at end of input.
    fn report(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let tokens = self.tokens;
        let target = self
            .significant
            .get(self.pos)
            .or_else(|| self.significant.last())
            .map(|&i| &tokens[i]);
        let diagnostic = match target {
            Some(token) => {
                let line = token.line.saturating_sub(1);
                let start = self.line_map.offset_of(line, token.column);
                let span = TextSpan::new(start, token.len() as u32);
                Diagnostic::with_location(span, line, message, args)
            }
            None => Diagnostic::new(message, args),
        };
        self.diagnostics.add(diagnostic);
    }

    fn report_expected(&mut self, kind: SyntaxKind) {
        let expected = describe_kind(kind);
        if self.is_eof() {
            self.report(&messages::_0_EXPECTED, &[expected.as_str()]);
        } else {
            let found = self.describe_current();
            self.report(
                &messages::MISMATCHED_INPUT_0_1_EXPECTED,
                &[found.as_str(), expected.as_str()],
            );
        }
    }

    fn report_unexpected(&mut self) {
        if self.is_eof() {
            self.report(&messages::_0_EXPECTED, &["expression"]);
        } else {
            let found = self.describe_current();
            self.report(&messages::UNEXPECTED_0, &[found.as_str()]);
        }
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statement_list(
        &mut self,
        statements: &mut Vec<CstNode>,
        until: fn(&Self) -> bool,
    ) -> Result<(), SyntaxError> {
        while !self.is_eof() && !until(self) {
            let before = self.pos;
            let statement = self.parse_statement()?;
            if self.pos == before {
                self.skip_to_next_statement();
            } else {
                statements.push(statement);
            }
        }
        Ok(())
    }

    /// Error recovery: skip the offending token and any following tokens
    /// that cannot begin a statement.
    fn skip_to_next_statement(&mut self) {
        self.bump();
        while !self.is_eof() && !self.can_start_statement() {
            self.bump();
        }
    }

    fn can_start_statement(&self) -> bool {
        let kind = self.current();
        if is_identifier(kind) || kind.is_literal() {
            return true;
        }
        matches!(
            kind,
            SyntaxKind::OpenBraceToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::PlusToken
                | SyntaxKind::MinusToken
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::ExclamationToken
                | SyntaxKind::TildeToken
                | SyntaxKind::Unknown
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::DeleteKeyword
                | SyntaxKind::DoKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::ForKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::IfKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::NullKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::SwitchKeyword
                | SyntaxKind::ThisKeyword
                | SyntaxKind::ThrowKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::TryKeyword
                | SyntaxKind::TypeOfKeyword
                | SyntaxKind::VarKeyword
                | SyntaxKind::VoidKeyword
                | SyntaxKind::WhileKeyword
                | SyntaxKind::WithKeyword
                | SyntaxKind::YieldKeyword
        )
    }

    fn parse_statement(&mut self) -> ParseResult {
        self.enter()?;
        let result = self.parse_statement_inner();
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self) -> ParseResult {
        match self.current() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                let index = self.bump();
                Ok(CstNode::new(SyntaxKind::EmptyStatement, index, Some(index)))
            }
            SyntaxKind::VarKeyword => {
                let declarations = self.parse_variable_declarations(false)?;
                self.consume_semicolon();
                Ok(declarations)
            }
            SyntaxKind::ConstKeyword => self.parse_const_statement(),
            SyntaxKind::FunctionKeyword => self.parse_function(true),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => self.parse_jump_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::WithKeyword => self.parse_with_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::DefaultKeyword if self.peek(1) == SyntaxKind::XmlKeyword => {
                self.parse_default_xml_namespace()
            }
            kind if is_identifier(kind) && self.peek(1) == SyntaxKind::ColonToken => {
                self.parse_labelled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> ParseResult {
        let start = self.index();
        self.expect(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        self.parse_statement_list(&mut statements, |g| g.at(SyntaxKind::CloseBraceToken))?;
        self.expect(SyntaxKind::CloseBraceToken);
        Ok(self.node(SyntaxKind::Block, start, statements))
    }

    /// `var`/`const` followed by a declarator list. The terminator is not consumed.
    fn parse_variable_declarations(&mut self, no_in: bool) -> ParseResult {
        let keyword = self.current();
        let start = self.bump();
        let mut declarators = Vec::new();
        loop {
            let name = self.parse_identifier();
            if self.eat(SyntaxKind::EqualsToken).is_some() {
                let name_start = name.start;
                let value = self.parse_assignment_expression(no_in)?;
                declarators.push(self.node(SyntaxKind::EqualsToken, name_start, vec![name, value]));
            } else {
                declarators.push(name);
            }
            if self.eat(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        Ok(self.node(keyword, start, declarators))
    }

    fn parse_const_statement(&mut self) -> ParseResult {
        let start = self.index();
        let mut declarations = self.parse_variable_declarations(false)?;
        self.consume_semicolon();
        declarations.stop = self.stop_since(start);
        Ok(declarations)
    }

    fn parse_identifier(&mut self) -> CstNode {
        if is_identifier(self.current()) {
            return self.leaf(SyntaxKind::Identifier);
        }
        self.report_expected(SyntaxKind::Identifier);
        CstNode::empty(SyntaxKind::Identifier, self.missing_index())
    }

    fn parse_paren_condition(&mut self) -> ParseResult {
        self.expect(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression(false)?;
        self.expect(SyntaxKind::CloseParenToken);
        Ok(condition)
    }

    fn parse_if_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let mut children = vec![self.parse_paren_condition()?, self.parse_statement()?];
        if self.eat(SyntaxKind::ElseKeyword).is_some() {
            children.push(self.parse_statement()?);
        }
        Ok(self.node(SyntaxKind::IfKeyword, start, children))
    }

    fn parse_do_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let body = self.parse_statement()?;
        self.expect(SyntaxKind::WhileKeyword);
        let condition = self.parse_paren_condition()?;
        // The `;` after do-while is always optional.
        self.eat(SyntaxKind::SemicolonToken);
        Ok(self.node(SyntaxKind::DoKeyword, start, vec![body, condition]))
    }

    fn parse_while_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let condition = self.parse_paren_condition()?;
        let body = self.parse_statement()?;
        Ok(self.node(SyntaxKind::WhileKeyword, start, vec![condition, body]))
    }

    fn parse_for_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let each = self.eat(SyntaxKind::EachKeyword).is_some();
        self.expect(SyntaxKind::OpenParenToken);
        let clause_start = self.index();
        let head = if self.at(SyntaxKind::VarKeyword) {
            let declarations = self.parse_variable_declarations(true)?;
            if self.at(SyntaxKind::InKeyword) {
                self.parse_for_iteration(clause_start, declarations)?
            } else {
                self.parse_for_steps(clause_start, Some(declarations))?
            }
        } else if self.at(SyntaxKind::SemicolonToken) {
            self.parse_for_steps(clause_start, None)?
        } else {
            let init = self.parse_expression(true)?;
            if self.at(SyntaxKind::InKeyword) {
                self.parse_for_iteration(clause_start, init)?
            } else {
                self.parse_for_steps(clause_start, Some(init))?
            }
        };
        self.expect(SyntaxKind::CloseParenToken);
        let body = self.parse_statement()?;

        let kind = if each && head.kind == SyntaxKind::ForIter {
            SyntaxKind::ForEach
        } else {
            if each {
                self.diagnostics.add(self.expected_in_at(head.start));
            }
            SyntaxKind::ForKeyword
        };
        Ok(self.node(kind, start, vec![head, body]))
    }

    /// `for each` requires the iteration form.
    fn expected_in_at(&self, index: usize) -> Diagnostic {
        let expected = describe_kind(SyntaxKind::InKeyword);
        match self.tokens.get(index) {
            Some(token) => {
                let line = token.line.saturating_sub(1);
                let start = self.line_map.offset_of(line, token.column);
                Diagnostic::with_location(
                    TextSpan::new(start, token.len() as u32),
                    line,
                    &messages::_0_EXPECTED,
                    &[expected.as_str()],
                )
            }
            None => Diagnostic::new(&messages::_0_EXPECTED, &[expected.as_str()]),
        }
    }

    fn parse_for_iteration(&mut self, start: usize, item: CstNode) -> ParseResult {
        self.bump(); // in
        let iterator = self.parse_expression(false)?;
        Ok(self.node(SyntaxKind::ForIter, start, vec![item, iterator]))
    }

    /// `init; condition; step`. Omitted parts are empty `Expr` nodes positioned
    /// at the `;` or `)` that follows them.
    fn parse_for_steps(&mut self, start: usize, init: Option<CstNode>) -> ParseResult {
        let init = match init {
            Some(init) => wrap_expr(init),
            None => CstNode::empty(SyntaxKind::Expr, self.index()),
        };
        self.expect(SyntaxKind::SemicolonToken);
        let condition = if self.at(SyntaxKind::SemicolonToken) {
            CstNode::empty(SyntaxKind::Expr, self.index())
        } else {
            wrap_expr(self.parse_expression(false)?)
        };
        self.expect(SyntaxKind::SemicolonToken);
        let step = if self.at(SyntaxKind::CloseParenToken) {
            CstNode::empty(SyntaxKind::Expr, self.index())
        } else {
            wrap_expr(self.parse_expression(false)?)
        };
        Ok(self.node(SyntaxKind::ForStep, start, vec![init, condition, step]))
    }

    fn parse_jump_statement(&mut self) -> ParseResult {
        let kind = self.current();
        let start = self.bump();
        let mut children = Vec::new();
        if is_identifier(self.current()) && !self.has_preceding_line_break() {
            children.push(self.leaf(SyntaxKind::Identifier));
        }
        self.consume_semicolon();
        Ok(self.node(kind, start, children))
    }

    fn parse_return_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let mut children = Vec::new();
        let ends_here = matches!(
            self.current(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        );
        if !ends_here && !self.has_preceding_line_break() {
            children.push(self.parse_expression(false)?);
        }
        self.consume_semicolon();
        Ok(self.node(SyntaxKind::ReturnKeyword, start, children))
    }

    fn parse_throw_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let value = self.parse_expression(false)?;
        self.consume_semicolon();
        Ok(self.node(SyntaxKind::ThrowKeyword, start, vec![value]))
    }

    fn parse_with_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let object = self.parse_paren_condition()?;
        let body = self.parse_statement()?;
        Ok(self.node(SyntaxKind::WithKeyword, start, vec![object, body]))
    }

    fn at_clause_end(&self) -> bool {
        match self.current() {
            SyntaxKind::CaseKeyword | SyntaxKind::CloseBraceToken => true,
            SyntaxKind::DefaultKeyword => self.peek(1) != SyntaxKind::XmlKeyword,
            _ => false,
        }
    }

    fn parse_switch_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let mut children = vec![self.parse_paren_condition()?];
        self.expect(SyntaxKind::OpenBraceToken);
        while !self.is_eof() && !self.at(SyntaxKind::CloseBraceToken) {
            match self.current() {
                SyntaxKind::CaseKeyword => {
                    let clause_start = self.bump();
                    let mut clause = vec![self.parse_expression(false)?];
                    self.expect(SyntaxKind::ColonToken);
                    self.parse_statement_list(&mut clause, Self::at_clause_end)?;
                    children.push(self.node(SyntaxKind::CaseKeyword, clause_start, clause));
                }
                SyntaxKind::DefaultKeyword if self.at_clause_end() => {
                    let clause_start = self.bump();
                    let mut clause = Vec::new();
                    self.expect(SyntaxKind::ColonToken);
                    self.parse_statement_list(&mut clause, Self::at_clause_end)?;
                    children.push(self.node(SyntaxKind::DefaultKeyword, clause_start, clause));
                }
                _ => {
                    self.report_unexpected();
                    while !self.is_eof() && !self.at_clause_end() {
                        self.bump();
                    }
                }
            }
        }
        self.expect(SyntaxKind::CloseBraceToken);
        Ok(self.node(SyntaxKind::SwitchKeyword, start, children))
    }

    fn parse_try_statement(&mut self) -> ParseResult {
        let start = self.bump();
        let mut children = vec![self.parse_block()?];
        while self.at(SyntaxKind::CatchKeyword) {
            let clause_start = self.bump();
            self.expect(SyntaxKind::OpenParenToken);
            let mut clause = vec![self.parse_identifier()];
            if self.at(SyntaxKind::IfKeyword) {
                let filter_start = self.bump();
                let condition = self.parse_expression(false)?;
                clause.push(self.node(SyntaxKind::IfKeyword, filter_start, vec![condition]));
            }
            self.expect(SyntaxKind::CloseParenToken);
            clause.push(self.parse_block()?);
            children.push(self.node(SyntaxKind::CatchKeyword, clause_start, clause));
        }
        if self.at(SyntaxKind::FinallyKeyword) {
            let clause_start = self.bump();
            let block = self.parse_block()?;
            children.push(self.node(SyntaxKind::FinallyKeyword, clause_start, vec![block]));
        }
        if children.len() == 1 {
            self.report_expected(SyntaxKind::CatchKeyword);
        }
        Ok(self.node(SyntaxKind::TryKeyword, start, children))
    }

    fn parse_function(&mut self, is_statement: bool) -> ParseResult {
        let start = self.bump();
        let mut children = Vec::new();
        if is_identifier(self.current()) {
            children.push(self.leaf(SyntaxKind::Identifier));
        } else if is_statement {
            self.report_expected(SyntaxKind::Identifier);
        }
        let params_start = self.index();
        self.expect(SyntaxKind::OpenParenToken);
        let mut params = Vec::new();
        if !self.at(SyntaxKind::CloseParenToken) {
            loop {
                params.push(self.parse_identifier());
                if self.eat(SyntaxKind::CommaToken).is_none() {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::CloseParenToken);
        children.push(self.node(SyntaxKind::Arguments, params_start, params));
        children.push(self.parse_block()?);
        Ok(self.node(SyntaxKind::FunctionKeyword, start, children))
    }

    /// `default xml namespace = expr`
    fn parse_default_xml_namespace(&mut self) -> ParseResult {
        let start = self.index();
        let mut children = vec![
            self.leaf(SyntaxKind::DefaultKeyword),
            self.leaf(SyntaxKind::XmlKeyword),
        ];
        if self.at(SyntaxKind::NamespaceKeyword) {
            children.push(self.leaf(SyntaxKind::NamespaceKeyword));
        } else {
            self.report_expected(SyntaxKind::NamespaceKeyword);
        }
        if self.at(SyntaxKind::EqualsToken) {
            children.push(self.leaf(SyntaxKind::EqualsToken));
        } else {
            self.report_expected(SyntaxKind::EqualsToken);
        }
        children.push(self.parse_expression(false)?);
        self.consume_semicolon();
        Ok(self.node(SyntaxKind::DefaultXmlNamespace, start, children))
    }

    fn parse_labelled_statement(&mut self) -> ParseResult {
        let start = self.index();
        let label = self.leaf(SyntaxKind::Identifier);
        self.bump(); // :
        let body = self.parse_statement()?;
        Ok(self.node(SyntaxKind::Labelled, start, vec![label, body]))
    }

    fn parse_expression_statement(&mut self) -> ParseResult {
        let expression = self.parse_expression(false)?;
        if !expression.is_empty() {
            self.consume_semicolon();
        }
        Ok(expression)
    }

    // ========================================================================
    // Expression parsing
    // ========================================================================

    // Everything from here to `parse_primary_expression` is on the stack
    // once per nesting level. Keep these frames small: work done after the
    // recursive call belongs in a `*_rest` function.

    fn parse_expression(&mut self, no_in: bool) -> ParseResult {
        let first = self.parse_assignment_expression(no_in)?;
        if !self.at(SyntaxKind::CommaToken) {
            return Ok(first);
        }
        self.parse_comma_expression_rest(first, no_in)
    }

    fn parse_comma_expression_rest(&mut self, first: CstNode, no_in: bool) -> ParseResult {
        let start = first.start;
        let mut items = vec![first];
        while self.eat(SyntaxKind::CommaToken).is_some() {
            items.push(self.parse_assignment_expression(no_in)?);
        }
        Ok(self.node(SyntaxKind::CommaExpr, start, items))
    }

    fn parse_assignment_expression(&mut self, no_in: bool) -> ParseResult {
        self.enter()?;
        let result = self.parse_assignment_expression_inner(no_in);
        self.leave();
        result
    }

    fn parse_assignment_expression_inner(&mut self, no_in: bool) -> ParseResult {
        if self.at(SyntaxKind::YieldKeyword) {
            return self.parse_yield_expression(no_in);
        }
        let target = self.parse_conditional_expression(no_in)?;
        if !self.current().is_assignment_operator() {
            return Ok(target);
        }
        self.parse_assignment_rest(target, no_in)
    }

    fn parse_assignment_rest(&mut self, target: CstNode, no_in: bool) -> ParseResult {
        let operator = self.current();
        self.bump();
        let value = self.parse_assignment_expression(no_in)?;
        let start = target.start;
        Ok(self.node(operator, start, vec![target, value]))
    }

    fn parse_yield_expression(&mut self, no_in: bool) -> ParseResult {
        let start = self.bump();
        let mut children = Vec::new();
        let ends_here = matches!(
            self.current(),
            SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::CommaToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::ColonToken
                | SyntaxKind::EndOfFileToken
        );
        if !ends_here && !self.has_preceding_line_break() {
            children.push(self.parse_assignment_expression(no_in)?);
        }
        Ok(self.node(SyntaxKind::YieldKeyword, start, children))
    }

    fn parse_conditional_expression(&mut self, no_in: bool) -> ParseResult {
        let condition = self.parse_binary_expression(OperatorPrecedence::Lowest, no_in)?;
        if !self.at(SyntaxKind::QuestionToken) {
            return Ok(condition);
        }
        self.parse_conditional_rest(condition, no_in)
    }

    fn parse_conditional_rest(&mut self, condition: CstNode, no_in: bool) -> ParseResult {
        self.bump();
        let when_true = self.parse_assignment_expression(false)?;
        self.expect(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression(no_in)?;
        let start = condition.start;
        Ok(self.node(
            SyntaxKind::QuestionToken,
            start,
            vec![condition, when_true, when_false],
        ))
    }

    fn parse_binary_expression(
        &mut self,
        min_precedence: OperatorPrecedence,
        no_in: bool,
    ) -> ParseResult {
        let left = self.parse_unary_expression()?;
        self.parse_binary_rest(left, min_precedence, no_in)
    }

    fn parse_binary_rest(
        &mut self,
        mut left: CstNode,
        min_precedence: OperatorPrecedence,
        no_in: bool,
    ) -> ParseResult {
        loop {
            let operator = self.current();
            if no_in && operator == SyntaxKind::InKeyword {
                break;
            }
            let precedence = get_binary_operator_precedence(operator);
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            self.bump();
            let right = self.parse_binary_expression(precedence, no_in)?;
            let start = left.start;
            left = self.node(operator, start, vec![left, right]);
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult {
        let kind = match self.current() {
            kind @ (SyntaxKind::DeleteKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken) => kind,
            SyntaxKind::PlusToken => SyntaxKind::UnaryPlus,
            SyntaxKind::MinusToken => SyntaxKind::UnaryMinus,
            _ => return self.parse_postfix_expression(),
        };
        self.parse_prefix_expression(kind)
    }

    fn parse_prefix_expression(&mut self, kind: SyntaxKind) -> ParseResult {
        self.enter()?;
        let start = self.bump();
        let operand = self.parse_unary_expression();
        self.leave();
        Ok(self.node(kind, start, vec![operand?]))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult {
        let operand = self.parse_member_expression(true)?;
        self.parse_postfix_rest(operand)
    }

    fn parse_postfix_rest(&mut self, operand: CstNode) -> ParseResult {
        let kind = match self.current() {
            SyntaxKind::PlusPlusToken if !self.has_preceding_line_break() => SyntaxKind::PostIncrement,
            SyntaxKind::MinusMinusToken if !self.has_preceding_line_break() => SyntaxKind::PostDecrement,
            _ => return Ok(operand),
        };
        self.bump();
        let start = operand.start;
        Ok(self.node(kind, start, vec![operand]))
    }

    /// Member access, E4X selectors and (when `allow_call`) calls.
    fn parse_member_expression(&mut self, allow_call: bool) -> ParseResult {
        let node = if self.at(SyntaxKind::NewKeyword) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression(true)?
        };
        self.parse_member_rest(node, allow_call)
    }

    fn parse_member_rest(&mut self, mut node: CstNode, allow_call: bool) -> ParseResult {
        loop {
            let start = node.start;
            node = match self.current() {
                SyntaxKind::DotToken => {
                    self.bump();
                    let property = self.parse_property_selector();
                    self.node(SyntaxKind::ByField, start, vec![node, property])
                }
                kind @ (SyntaxKind::DotDotToken | SyntaxKind::ColonColonToken) => {
                    self.bump();
                    let property = self.parse_property_selector();
                    self.node(kind, start, vec![node, property])
                }
                SyntaxKind::OpenBracketToken => {
                    self.bump();
                    let index = self.parse_expression(false)?;
                    self.expect(SyntaxKind::CloseBracketToken);
                    self.node(SyntaxKind::ByIndex, start, vec![node, index])
                }
                SyntaxKind::OpenParenToken if allow_call => {
                    let arguments = self.parse_arguments()?;
                    self.node(SyntaxKind::Call, start, vec![node, arguments])
                }
                _ => return Ok(node),
            };
        }
    }

    fn parse_new_expression(&mut self) -> ParseResult {
        self.enter()?;
        let start = self.bump();
        let callee = self.parse_member_expression(false);
        self.leave();
        self.parse_new_rest(start, callee?)
    }

    fn parse_new_rest(&mut self, start: usize, callee: CstNode) -> ParseResult {
        let target = if self.at(SyntaxKind::OpenParenToken) {
            let callee_start = callee.start;
            let arguments = self.parse_arguments()?;
            self.node(SyntaxKind::Call, callee_start, vec![callee, arguments])
        } else {
            callee
        };
        Ok(self.node(SyntaxKind::NewKeyword, start, vec![target]))
    }

    fn parse_arguments(&mut self) -> ParseResult {
        let start = self.index();
        self.expect(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        if !self.at(SyntaxKind::CloseParenToken) {
            loop {
                arguments.push(self.parse_assignment_expression(false)?);
                if self.eat(SyntaxKind::CommaToken).is_none() {
                    break;
                }
            }
        }
        self.expect(SyntaxKind::CloseParenToken);
        Ok(self.node(SyntaxKind::Arguments, start, arguments))
    }

    /// The name after `.`, `..` or `::`.
    fn parse_property_selector(&mut self) -> CstNode {
        match self.current() {
            SyntaxKind::XmlAttribute => self.leaf(SyntaxKind::XmlAttribute),
            SyntaxKind::AsteriskToken => self.leaf(SyntaxKind::AsteriskToken),
            kind if kind == SyntaxKind::Identifier || kind.is_keyword() => {
                self.leaf(SyntaxKind::Identifier)
            }
            _ => {
                let found = self.describe_current();
                self.report(
                    &messages::MISMATCHED_INPUT_0_EXPECTING_SET_1,
                    &[found.as_str(), "{identifier, '@attribute', '*'}"],
                );
                CstNode::empty(SyntaxKind::Identifier, self.missing_index())
            }
        }
    }

    /// A primary expression. An invalid character in operand position is
    /// deleted and the operand retried once; any other token that cannot start
    /// an operand yields an empty `Expr`.
    fn parse_primary_expression(&mut self, retry: bool) -> ParseResult {
        let kind = self.current();
        match kind {
            SyntaxKind::ThisKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::DecimalLiteral
            | SyntaxKind::HexIntegerLiteral
            | SyntaxKind::OctalIntegerLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::RegularExpressionLiteral
            | SyntaxKind::XmlAttribute => Ok(self.leaf(kind)),
            kind if is_identifier(kind) => Ok(self.leaf(SyntaxKind::Identifier)),
            SyntaxKind::OpenParenToken => self.parse_parenthesized(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => self.parse_function(false),
            SyntaxKind::XmlFragment | SyntaxKind::XmlFragmentEnd => self.parse_xml_literal(),
            SyntaxKind::Unknown if retry => {
                self.report_unexpected();
                self.bump();
                self.parse_primary_expression(false)
            }
            _ => {
                self.report_unexpected();
                Ok(CstNode::empty(SyntaxKind::Expr, self.missing_index()))
            }
        }
    }

    fn parse_parenthesized(&mut self) -> ParseResult {
        let start = self.bump();
        let inner = self.parse_expression(false)?;
        self.parse_parenthesized_rest(start, inner)
    }

    fn parse_parenthesized_rest(&mut self, start: usize, inner: CstNode) -> ParseResult {
        self.expect(SyntaxKind::CloseParenToken);
        Ok(self.node(SyntaxKind::Paren, start, vec![inner]))
    }

    /// `[a, , b]`. A hole is an empty `Item` positioned at its comma.
    fn parse_array_literal(&mut self) -> ParseResult {
        let start = self.bump();
        let mut items = Vec::new();
        while !self.is_eof() && !self.at(SyntaxKind::CloseBracketToken) {
            if self.at(SyntaxKind::CommaToken) {
                let comma = self.bump();
                items.push(CstNode::empty(SyntaxKind::Item, comma));
                continue;
            }
            let value = self.parse_assignment_expression(false)?;
            let item_start = value.start;
            let item_stop = value.real_stop();
            items.push(CstNode::new(SyntaxKind::Item, item_start, item_stop).with_children(vec![value]));
            if self.eat(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect(SyntaxKind::CloseBracketToken);
        Ok(self.node(SyntaxKind::ArrayLiteral, start, items))
    }

    fn parse_object_literal(&mut self) -> ParseResult {
        let start = self.bump();
        let mut members = Vec::new();
        while !self.is_eof() && !self.at(SyntaxKind::CloseBraceToken) {
            members.push(self.parse_property_assignment()?);
            if self.eat(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect(SyntaxKind::CloseBraceToken);
        Ok(self.node(SyntaxKind::ObjectLiteral, start, members))
    }

    fn parse_property_assignment(&mut self) -> ParseResult {
        let kind = self.current();
        if matches!(kind, SyntaxKind::GetKeyword | SyntaxKind::SetKeyword)
            && is_property_name(self.peek(1))
        {
            return self.parse_accessor(kind);
        }
        let start = self.index();
        let name = self.parse_property_name();
        self.expect(SyntaxKind::ColonToken);
        let value = self.parse_assignment_expression(false)?;
        Ok(self.node(SyntaxKind::PropertyInit, start, vec![name, value]))
    }

    fn parse_property_name(&mut self) -> CstNode {
        match self.current() {
            kind @ (SyntaxKind::StringLiteral
            | SyntaxKind::DecimalLiteral
            | SyntaxKind::HexIntegerLiteral
            | SyntaxKind::OctalIntegerLiteral) => self.leaf(kind),
            kind if kind == SyntaxKind::Identifier || kind.is_keyword() => {
                self.leaf(SyntaxKind::Identifier)
            }
            _ => {
                let found = self.describe_current();
                self.report(
                    &messages::MISMATCHED_INPUT_0_EXPECTING_SET_1,
                    &[found.as_str(), "{identifier, string, number}"],
                );
                CstNode::empty(SyntaxKind::Identifier, self.missing_index())
            }
        }
    }

    /// `get name() {...}` or `set name(value) {...}`.
    fn parse_accessor(&mut self, kind: SyntaxKind) -> ParseResult {
        let start = self.bump();
        let mut children = vec![self.parse_property_name()];
        self.expect(SyntaxKind::OpenParenToken);
        if kind == SyntaxKind::SetKeyword {
            children.push(self.parse_identifier());
        }
        self.expect(SyntaxKind::CloseParenToken);
        children.push(self.parse_block()?);
        Ok(self.node(kind, start, children))
    }

    /// XML text fragments interleaved with `{expression}` parts, ending with
    /// the closing fragment.
    fn parse_xml_literal(&mut self) -> ParseResult {
        let start = self.index();
        let mut parts = Vec::new();
        loop {
            match self.current() {
                SyntaxKind::XmlFragment => parts.push(self.leaf(SyntaxKind::XmlFragment)),
                SyntaxKind::XmlFragmentEnd => {
                    parts.push(self.leaf(SyntaxKind::XmlFragmentEnd));
                    break;
                }
                SyntaxKind::OpenBraceToken => {
                    self.bump();
                    parts.push(self.parse_expression(false)?);
                    self.expect(SyntaxKind::CloseBraceToken);
                }
                _ => {
                    self.report_expected(SyntaxKind::XmlFragmentEnd);
                    break;
                }
            }
        }
        Ok(self.node(SyntaxKind::XmlLiteral, start, parts))
    }
}
