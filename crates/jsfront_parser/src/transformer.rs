//! Lowering of the concrete syntax tree into the AST.
//!
//! One builder per node kind, selected by a flat match on the CST tag.
//! Child bounds come from the CST; offsets of punctuation and keywords that
//! have no CST node of their own are found by searching the token window
//! between two neighbouring children. All windows here are half-open:
//! `[from, until)` in token indices.
//!
//! The ancestry of the node being built is threaded through every call as a
//! plain value. Its depth is checked on entry to each statement and
//! expression, so deep input fails with [`TransformError::TooDeep`] long
//! before the stack runs out.

use crate::error::TransformError;
use crate::offsets::OffsetMap;
use crate::window::TokenWindow;
use jsfront_ast::*;
use jsfront_core::text::{TextPos, TextRange};
use jsfront_grammar::{get_binary_operator_precedence, OperatorPrecedence};
use jsfront_syntax::{CstNode, SyntaxKind, Token};
use tracing::trace;

type TransformResult<T> = Result<T, TransformError>;

/// Where a node sits: the kind of its parent and how many ancestors it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ancestry {
    parent: NodeKind,
    depth: u32,
}

impl Ancestry {
    fn root() -> Self {
        Self {
            parent: NodeKind::Script,
            depth: 0,
        }
    }

    /// The ancestry of a child of a `parent` node with this ancestry.
    fn enter(self, parent: NodeKind) -> Self {
        Self {
            parent,
            depth: self.depth + 1,
        }
    }
}

fn child<'c>(cst: &'c CstNode, index: usize, what: &'static str) -> TransformResult<&'c CstNode> {
    cst.child(index).ok_or(TransformError::MissingChild {
        parent: cst.kind,
        what,
    })
}

fn is_binary_operator(kind: SyntaxKind) -> bool {
    kind.is_assignment_operator()
        || get_binary_operator_precedence(kind) != OperatorPrecedence::Invalid
}

/// Builds an AST [`Script`] from a CST and the token list it indexes.
pub struct Transformer<'t> {
    window: TokenWindow<'t>,
    max_depth: u32,
}

impl<'t> Transformer<'t> {
    pub fn new(tokens: &'t [Token], offsets: &'t OffsetMap, max_depth: u32) -> Self {
        Self {
            window: TokenWindow::new(tokens, offsets),
            max_depth,
        }
    }

    /// Lower `cst` into a script spanning the whole source. A missing tree
    /// gives an empty script. Comments are not attached here.
    pub fn transform(&self, cst: Option<&CstNode>) -> TransformResult<Script> {
        let source_len = self.window.offsets().source_len();
        let Some(cst) = cst else {
            return Ok(Script::empty(source_len));
        };
        if cst.kind != SyntaxKind::Script {
            return Err(TransformError::UnexpectedNode {
                found: cst.kind,
                parent: NodeKind::Script,
            });
        }
        let statements = self.statement_list(&cst.children, Ancestry::root(), self.tokens().len())?;
        Ok(Script {
            range: TextRange::new(0, source_len),
            statements,
            comments: Vec::new(),
        })
    }

    // ========================================================================
    // Positions
    // ========================================================================

    #[inline]
    fn tokens(&self) -> &'t [Token] {
        self.window.tokens()
    }

    #[inline]
    fn offset(&self, index: usize) -> TextPos {
        self.window.offsets().offset(index)
    }

    fn span(start: TextPos, end: TextPos) -> TextRange {
        TextRange::new(start, end.max(start))
    }

    /// From the node's first token to the end of the last token it or any
    /// descendant covers.
    fn range_of(&self, cst: &CstNode) -> TextRange {
        Self::span(self.offset(cst.start), self.offset(cst.after()))
    }

    /// A leaf's range is its start plus its text length.
    fn leaf_range(&self, cst: &CstNode) -> TextRange {
        TextRange::at(self.offset(cst.start), cst.text().len())
    }

    fn find_index(&self, kind: SyntaxKind, from: usize, until: usize) -> Option<usize> {
        if from >= until {
            return None;
        }
        self.window.find_index(kind, from, until - 1)
    }

    fn find(&self, kind: SyntaxKind, from: usize, until: usize) -> Option<TextPos> {
        self.find_index(kind, from, until)
            .map(|index| self.offset(index))
    }

    fn require(&self, kind: SyntaxKind, from: usize, until: usize) -> TransformResult<TextPos> {
        self.find(kind, from, until)
            .ok_or(TransformError::TokenNotFound {
                kind,
                start: from,
                stop: until,
            })
    }

    /// Operator position, retrying with the fallback kind for retagged operators.
    fn operator(&self, kind: SyntaxKind, from: usize, until: usize) -> TransformResult<TextPos> {
        let found = if from < until {
            self.window.find_operator(kind, from, until - 1)
        } else {
            None
        };
        found
            .map(|index| self.offset(index))
            .ok_or(TransformError::TokenNotFound {
                kind,
                start: from,
                stop: until,
            })
    }

    fn keyword_at(&self, index: usize) -> Option<Keyword> {
        self.tokens().get(index).map(|token| {
            Keyword::new(TextRange::at(self.offset(index), token.len()), token.kind)
        })
    }

    fn find_keyword(&self, kind: SyntaxKind, from: usize, until: usize) -> Option<Keyword> {
        self.find_index(kind, from, until)
            .and_then(|index| self.keyword_at(index))
    }

    /// The keyword token at `index`, which must be of `kind`.
    fn keyword(&self, kind: SyntaxKind, index: usize) -> TransformResult<Keyword> {
        self.find_keyword(kind, index, index + 1)
            .ok_or(TransformError::TokenNotFound {
                kind,
                start: index,
                stop: index,
            })
    }

    /// Offsets of the commas between consecutive items.
    fn commas(&self, items: &[CstNode]) -> TransformResult<Vec<TextPos>> {
        items
            .windows(2)
            .map(|pair| self.require(SyntaxKind::CommaToken, pair[0].after(), pair[1].start))
            .collect()
    }

    fn guard(&self, ancestry: Ancestry) -> TransformResult<()> {
        if ancestry.depth > self.max_depth {
            return Err(TransformError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement_list(
        &self,
        children: &[CstNode],
        parent: Ancestry,
        until: usize,
    ) -> TransformResult<Vec<Statement>> {
        children
            .iter()
            .map(|cst| self.transform_statement(cst, parent, until))
            .collect()
    }

    /// `until` bounds the enclosing node, for finding an expression
    /// statement's terminator.
    fn transform_statement(
        &self,
        cst: &CstNode,
        parent: Ancestry,
        until: usize,
    ) -> TransformResult<Statement> {
        self.guard(parent)?;
        trace!(kind = %cst.kind, depth = parent.depth, "statement");
        match cst.kind {
            SyntaxKind::Block => self.block(cst, parent).map(Statement::Block),
            SyntaxKind::EmptyStatement => Ok(Statement::Empty(EmptyStatement {
                range: self.range_of(cst),
            })),
            SyntaxKind::ConstKeyword => self.const_statement(cst, parent).map(Statement::Const),
            SyntaxKind::IfKeyword => self.if_statement(cst, parent).map(Statement::If),
            SyntaxKind::WhileKeyword => self.while_statement(cst, parent).map(Statement::While),
            SyntaxKind::DoKeyword => self.do_while_statement(cst, parent).map(Statement::DoWhile),
            SyntaxKind::ForKeyword | SyntaxKind::ForEach => self.for_statement(cst, parent),
            SyntaxKind::SwitchKeyword => self.switch_statement(cst, parent).map(Statement::Switch),
            SyntaxKind::TryKeyword => self.try_statement(cst, parent).map(Statement::Try),
            SyntaxKind::ThrowKeyword => self.throw_statement(cst, parent).map(Statement::Throw),
            SyntaxKind::ReturnKeyword => self.return_statement(cst, parent).map(Statement::Return),
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                self.jump_statement(cst).map(Statement::Jump)
            }
            SyntaxKind::Labelled => self.labelled_statement(cst, parent).map(Statement::Labelled),
            SyntaxKind::WithKeyword => self.with_statement(cst, parent).map(Statement::With),
            SyntaxKind::DefaultXmlNamespace => self
                .default_xml_namespace(cst, parent)
                .map(Statement::DefaultXmlNamespace),
            SyntaxKind::FunctionKeyword
                if cst.child(0).map_or(false, |name| name.kind == SyntaxKind::Identifier) =>
            {
                self.function(cst, parent).map(Statement::Function)
            }
            _ => self
                .expression_statement(cst, parent, until)
                .map(Statement::Expression),
        }
    }

    /// Any other node in statement position. The statement takes in the
    /// `;` that directly follows the expression, if there is one.
    fn expression_statement(
        &self,
        cst: &CstNode,
        parent: Ancestry,
        until: usize,
    ) -> TransformResult<ExpressionStatement> {
        let expression = self.transform_expression(cst, parent.enter(NodeKind::ExpressionStatement))?;
        let mut range = expression.range();
        let mut semicolon = None;
        if !cst.is_empty() {
            let from = cst.after();
            let next = if from < until {
                self.window.next_significant(from, until - 1)
            } else {
                None
            };
            let terminator = next.filter(|&index| {
                self.tokens()
                    .get(index)
                    .map_or(false, |token| token.kind == SyntaxKind::SemicolonToken)
            });
            if let Some(index) = terminator {
                let offset = self.offset(index);
                semicolon = Some(offset);
                range = Self::span(range.start, offset + 1);
            }
        }
        Ok(ExpressionStatement {
            range,
            expression,
            semicolon,
        })
    }

    fn block(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Block> {
        if cst.kind != SyntaxKind::Block {
            return Err(TransformError::UnexpectedNode {
                found: cst.kind,
                parent: parent.parent,
            });
        }
        let inner = parent.enter(NodeKind::Block);
        let until = cst.after();
        let lc = self.find_index(SyntaxKind::OpenBraceToken, cst.start, cst.start + 1);
        let statements = self.statement_list(&cst.children, inner, until)?;
        let content_end = match cst.children.last() {
            Some(last) => last.after(),
            None => lc.map_or(cst.start, |index| index + 1),
        };
        Ok(Block {
            range: self.range_of(cst),
            lc: lc.map(|index| self.offset(index)),
            statements,
            rc: self.find(SyntaxKind::CloseBraceToken, content_end, until),
        })
    }

    fn const_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<ConstStatement> {
        let inner = parent.enter(NodeKind::ConstStatement);
        let const_keyword = self.keyword(SyntaxKind::ConstKeyword, cst.start)?;
        let declarations = self.declarators(cst, inner)?;
        let commas = self.commas(&cst.children)?;
        let content_end = cst.children.last().map_or(cst.start + 1, CstNode::after);
        Ok(ConstStatement {
            range: self.range_of(cst),
            const_keyword,
            declarations,
            commas,
            semicolon: self.find(SyntaxKind::SemicolonToken, content_end, cst.after()),
        })
    }

    fn if_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<IfStatement> {
        let inner = parent.enter(NodeKind::IfStatement);
        let until = cst.after();
        let if_keyword = self.keyword(SyntaxKind::IfKeyword, cst.start)?;
        let condition_cst = child(cst, 0, "condition")?;
        let then_cst = child(cst, 1, "statement")?;

        let lp = self.find(SyntaxKind::OpenParenToken, cst.start + 1, condition_cst.start);
        let condition = self.transform_expression(condition_cst, inner)?;
        let rp = self.find(SyntaxKind::CloseParenToken, condition_cst.after(), then_cst.start);
        let then_statement = Box::new(self.transform_statement(then_cst, inner, until)?);

        let (else_keyword, else_statement) = match cst.child(2) {
            Some(else_cst) => (
                self.find_keyword(SyntaxKind::ElseKeyword, then_cst.after(), else_cst.start),
                Some(Box::new(self.transform_statement(else_cst, inner, until)?)),
            ),
            None => (None, None),
        };

        Ok(IfStatement {
            range: self.range_of(cst),
            if_keyword,
            lp,
            condition,
            rp,
            then_statement,
            else_keyword,
            else_statement,
        })
    }

    fn while_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<WhileStatement> {
        let inner = parent.enter(NodeKind::WhileStatement);
        let while_keyword = self.keyword(SyntaxKind::WhileKeyword, cst.start)?;
        let condition_cst = child(cst, 0, "condition")?;
        let body_cst = child(cst, 1, "body")?;
        Ok(WhileStatement {
            range: self.range_of(cst),
            while_keyword,
            lp: self.find(SyntaxKind::OpenParenToken, cst.start + 1, condition_cst.start),
            condition: self.transform_expression(condition_cst, inner)?,
            rp: self.find(SyntaxKind::CloseParenToken, condition_cst.after(), body_cst.start),
            body: Box::new(self.transform_statement(body_cst, inner, cst.after())?),
        })
    }

    fn do_while_statement(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<DoWhileStatement> {
        let inner = parent.enter(NodeKind::DoWhileStatement);
        let until = cst.after();
        let do_keyword = self.keyword(SyntaxKind::DoKeyword, cst.start)?;
        let body_cst = child(cst, 0, "body")?;
        let condition_cst = child(cst, 1, "condition")?;

        let body = Box::new(self.transform_statement(body_cst, inner, until)?);
        let while_index = self.find_index(SyntaxKind::WhileKeyword, body_cst.after(), condition_cst.start);
        let paren_from = while_index.map_or(body_cst.after(), |index| index + 1);
        Ok(DoWhileStatement {
            range: self.range_of(cst),
            do_keyword,
            body,
            while_keyword: while_index.and_then(|index| self.keyword_at(index)),
            lp: self.find(SyntaxKind::OpenParenToken, paren_from, condition_cst.start),
            condition: self.transform_expression(condition_cst, inner)?,
            rp: self.find(SyntaxKind::CloseParenToken, condition_cst.after(), until),
            semicolon: self.find(SyntaxKind::SemicolonToken, condition_cst.after(), until),
        })
    }

    /// `for (;;)`, `for (… in …)` and `for each (… in …)`.
    fn for_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Statement> {
        let head = child(cst, 0, "loop head")?;
        let body_cst = child(cst, 1, "body")?;
        match (cst.kind, head.kind) {
            (SyntaxKind::ForKeyword, SyntaxKind::ForStep) => Ok(Statement::For(
                self.for_step_statement(cst, head, body_cst, parent)?,
            )),
            (SyntaxKind::ForKeyword | SyntaxKind::ForEach, SyntaxKind::ForIter) => Ok(
                Statement::ForIn(self.for_in_statement(cst, head, body_cst, parent)?),
            ),
            (_, found) => Err(TransformError::UnexpectedNode {
                found,
                parent: NodeKind::ForStatement,
            }),
        }
    }

    fn for_step_statement(
        &self,
        cst: &CstNode,
        head: &CstNode,
        body_cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<ForStatement> {
        let inner = parent.enter(NodeKind::ForStatement);
        let for_keyword = self.keyword(SyntaxKind::ForKeyword, cst.start)?;
        let initial_cst = child(head, 0, "initializer")?;
        let condition_cst = child(head, 1, "condition")?;
        let step_cst = child(head, 2, "step")?;
        Ok(ForStatement {
            range: self.range_of(cst),
            for_keyword,
            lp: self.find(SyntaxKind::OpenParenToken, cst.start + 1, head.start),
            initial: self.transform_expression(initial_cst, inner)?,
            initial_semicolon: self.find(
                SyntaxKind::SemicolonToken,
                initial_cst.after(),
                condition_cst.start,
            ),
            condition: self.transform_expression(condition_cst, inner)?,
            condition_semicolon: self.find(
                SyntaxKind::SemicolonToken,
                condition_cst.after(),
                step_cst.start,
            ),
            step: self.transform_expression(step_cst, inner)?,
            rp: self.find(SyntaxKind::CloseParenToken, step_cst.after(), body_cst.start),
            body: Box::new(self.transform_statement(body_cst, inner, cst.after())?),
        })
    }

    fn for_in_statement(
        &self,
        cst: &CstNode,
        head: &CstNode,
        body_cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<ForInStatement> {
        let is_each = cst.kind == SyntaxKind::ForEach;
        let inner = parent.enter(if is_each {
            NodeKind::ForEachInStatement
        } else {
            NodeKind::ForInStatement
        });
        let for_keyword = self.keyword(SyntaxKind::ForKeyword, cst.start)?;
        let each_keyword = if is_each {
            self.find_keyword(SyntaxKind::EachKeyword, cst.start + 1, head.start)
        } else {
            None
        };
        let item_cst = child(head, 0, "item")?;
        let iterator_cst = child(head, 1, "iterator")?;
        let in_keyword = self
            .find_keyword(SyntaxKind::InKeyword, item_cst.after(), iterator_cst.start)
            .ok_or(TransformError::TokenNotFound {
                kind: SyntaxKind::InKeyword,
                start: item_cst.after(),
                stop: iterator_cst.start,
            })?;
        Ok(ForInStatement {
            range: self.range_of(cst),
            for_keyword,
            each_keyword,
            lp: self.find(SyntaxKind::OpenParenToken, cst.start + 1, head.start),
            item: self.transform_expression(item_cst, inner)?,
            in_keyword,
            iterator: self.transform_expression(iterator_cst, inner)?,
            rp: self.find(SyntaxKind::CloseParenToken, iterator_cst.after(), body_cst.start),
            body: Box::new(self.transform_statement(body_cst, inner, cst.after())?),
        })
    }

    /// Clauses are lowered in source order whatever order the CST holds them in.
    fn switch_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<SwitchStatement> {
        let inner = parent.enter(NodeKind::SwitchStatement);
        let until = cst.after();
        let switch_keyword = self.keyword(SyntaxKind::SwitchKeyword, cst.start)?;
        let condition_cst = child(cst, 0, "condition")?;

        let mut clause_csts: Vec<&CstNode> = cst.children.iter().skip(1).collect();
        // Stable: equal bounds keep arrival order.
        clause_csts.sort_by_key(|clause| (clause.start, clause.real_stop()));

        let body_start = clause_csts.first().map_or(until, |clause| clause.start);
        let lc = self.find_index(SyntaxKind::OpenBraceToken, condition_cst.after(), body_start);
        let content_end = clause_csts
            .iter()
            .map(|clause| clause.after())
            .max()
            .unwrap_or_else(|| lc.map_or(condition_cst.after(), |index| index + 1));

        let clauses = clause_csts
            .into_iter()
            .map(|clause| self.switch_clause(clause, inner))
            .collect::<TransformResult<Vec<_>>>()?;

        Ok(SwitchStatement {
            range: self.range_of(cst),
            switch_keyword,
            lp: self.find(SyntaxKind::OpenParenToken, cst.start + 1, condition_cst.start),
            condition: self.transform_expression(condition_cst, inner)?,
            rp: self.find(
                SyntaxKind::CloseParenToken,
                condition_cst.after(),
                lc.unwrap_or(body_start),
            ),
            lc: lc.map(|index| self.offset(index)),
            clauses,
            rc: self.find(SyntaxKind::CloseBraceToken, content_end, until),
        })
    }

    fn switch_clause(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<SwitchClause> {
        let until = cst.after();
        match cst.kind {
            SyntaxKind::CaseKeyword => {
                let inner = parent.enter(NodeKind::CaseClause);
                let case_keyword = self.keyword(SyntaxKind::CaseKeyword, cst.start)?;
                let condition_cst = child(cst, 0, "condition")?;
                let body = &cst.children[1..];
                let body_start = body.first().map_or(until, |statement| statement.start);
                Ok(SwitchClause::Case(CaseClause {
                    range: self.range_of(cst),
                    case_keyword,
                    condition: self.transform_expression(condition_cst, inner)?,
                    colon: self.find(SyntaxKind::ColonToken, condition_cst.after(), body_start),
                    statements: self.statement_list(body, inner, until)?,
                }))
            }
            SyntaxKind::DefaultKeyword => {
                let inner = parent.enter(NodeKind::DefaultClause);
                let default_keyword = self.keyword(SyntaxKind::DefaultKeyword, cst.start)?;
                let body_start = cst.children.first().map_or(until, |statement| statement.start);
                Ok(SwitchClause::Default(DefaultClause {
                    range: self.range_of(cst),
                    default_keyword,
                    colon: self.find(SyntaxKind::ColonToken, cst.start + 1, body_start),
                    statements: self.statement_list(&cst.children, inner, until)?,
                }))
            }
            found => Err(TransformError::UnexpectedNode {
                found,
                parent: NodeKind::SwitchStatement,
            }),
        }
    }

    fn try_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<TryStatement> {
        let inner = parent.enter(NodeKind::TryStatement);
        let try_keyword = self.keyword(SyntaxKind::TryKeyword, cst.start)?;
        let body = self.block(child(cst, 0, "block")?, inner)?;
        let mut catches = Vec::new();
        let mut finally = None;
        for clause in cst.children.iter().skip(1) {
            match clause.kind {
                SyntaxKind::CatchKeyword => catches.push(self.catch_clause(clause, inner)?),
                SyntaxKind::FinallyKeyword => {
                    let finally_inner = inner.enter(NodeKind::FinallyClause);
                    finally = Some(FinallyClause {
                        range: self.range_of(clause),
                        finally_keyword: self.keyword(SyntaxKind::FinallyKeyword, clause.start)?,
                        body: self.block(child(clause, 0, "block")?, finally_inner)?,
                    });
                }
                found => {
                    return Err(TransformError::UnexpectedNode {
                        found,
                        parent: NodeKind::TryStatement,
                    })
                }
            }
        }
        Ok(TryStatement {
            range: self.range_of(cst),
            try_keyword,
            body,
            catches,
            finally,
        })
    }

    /// `catch (e)` or `catch (e if condition)`.
    fn catch_clause(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<CatchClause> {
        let inner = parent.enter(NodeKind::CatchClause);
        let catch_keyword = self.keyword(SyntaxKind::CatchKeyword, cst.start)?;
        let (exception_cst, body_cst) = match cst.children.as_slice() {
            [first, .., last] => (first, last),
            _ => {
                return Err(TransformError::MissingChild {
                    parent: cst.kind,
                    what: "block",
                })
            }
        };
        let filter = match cst.child(1) {
            Some(filter_cst) if filter_cst.kind == SyntaxKind::IfKeyword => {
                let filter_inner = inner.enter(NodeKind::ExceptionFilter);
                Some(ExceptionFilter {
                    range: self.range_of(filter_cst),
                    if_keyword: self.keyword(SyntaxKind::IfKeyword, filter_cst.start)?,
                    expression: self
                        .transform_expression(child(filter_cst, 0, "condition")?, filter_inner)?,
                })
            }
            _ => None,
        };
        let head_end = match cst.child(1) {
            Some(filter_cst) if filter.is_some() => filter_cst.after(),
            _ => exception_cst.after(),
        };
        Ok(CatchClause {
            range: self.range_of(cst),
            catch_keyword,
            lp: self.find(SyntaxKind::OpenParenToken, cst.start + 1, exception_cst.start),
            exception: self.identifier(exception_cst, inner)?,
            filter,
            rp: self.find(SyntaxKind::CloseParenToken, head_end, body_cst.start),
            body: self.block(body_cst, inner)?,
        })
    }

    fn throw_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<ThrowStatement> {
        let inner = parent.enter(NodeKind::ThrowStatement);
        let exception_cst = child(cst, 0, "exception")?;
        Ok(ThrowStatement {
            range: self.range_of(cst),
            throw_keyword: self.keyword(SyntaxKind::ThrowKeyword, cst.start)?,
            exception: self.transform_expression(exception_cst, inner)?,
            semicolon: self.find(SyntaxKind::SemicolonToken, exception_cst.after(), cst.after()),
        })
    }

    fn return_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<ReturnStatement> {
        let inner = parent.enter(NodeKind::ReturnStatement);
        let value = cst
            .child(0)
            .map(|value| self.transform_expression(value, inner))
            .transpose()?;
        let content_end = cst.child(0).map_or(cst.start + 1, CstNode::after);
        Ok(ReturnStatement {
            range: self.range_of(cst),
            return_keyword: self.keyword(SyntaxKind::ReturnKeyword, cst.start)?,
            value,
            semicolon: self.find(SyntaxKind::SemicolonToken, content_end, cst.after()),
        })
    }

    fn jump_statement(&self, cst: &CstNode) -> TransformResult<JumpStatement> {
        let content_end = cst.child(0).map_or(cst.start + 1, CstNode::after);
        Ok(JumpStatement {
            range: self.range_of(cst),
            keyword: self.keyword(cst.kind, cst.start)?,
            label: cst.child(0).map(|label| self.label(label)),
            semicolon: self.find(SyntaxKind::SemicolonToken, content_end, cst.after()),
        })
    }

    fn label(&self, cst: &CstNode) -> Label {
        Label {
            range: self.leaf_range(cst),
            text: cst.text().to_string(),
        }
    }

    fn labelled_statement(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<LabelledStatement> {
        let inner = parent.enter(NodeKind::LabelledStatement);
        let label_cst = child(cst, 0, "label")?;
        let statement_cst = child(cst, 1, "statement")?;
        Ok(LabelledStatement {
            range: self.range_of(cst),
            label: self.label(label_cst),
            colon: self.find(SyntaxKind::ColonToken, label_cst.after(), statement_cst.start),
            statement: Box::new(self.transform_statement(statement_cst, inner, cst.after())?),
        })
    }

    fn with_statement(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<WithStatement> {
        let inner = parent.enter(NodeKind::WithStatement);
        let object_cst = child(cst, 0, "object")?;
        let statement_cst = child(cst, 1, "statement")?;
        Ok(WithStatement {
            range: self.range_of(cst),
            with_keyword: self.keyword(SyntaxKind::WithKeyword, cst.start)?,
            lp: self.find(SyntaxKind::OpenParenToken, cst.start + 1, object_cst.start),
            expression: self.transform_expression(object_cst, inner)?,
            rp: self.find(SyntaxKind::CloseParenToken, object_cst.after(), statement_cst.start),
            statement: Box::new(self.transform_statement(statement_cst, inner, cst.after())?),
        })
    }

    /// `default xml namespace = value`. The CST keeps the keywords and `=`
    /// as leaves ahead of the value.
    fn default_xml_namespace(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<DefaultXmlNamespaceStatement> {
        let inner = parent.enter(NodeKind::DefaultXmlNamespaceStatement);
        let (value_cst, middle) = match cst.children.split_last() {
            Some((value, leading)) if leading.len() >= 2 => (value, &leading[2..]),
            _ => {
                return Err(TransformError::MissingChild {
                    parent: cst.kind,
                    what: "value",
                })
            }
        };
        let mut namespace_keyword = None;
        let mut assign = None;
        for part in middle {
            match part.kind {
                SyntaxKind::NamespaceKeyword => {
                    namespace_keyword = Some(self.keyword(SyntaxKind::NamespaceKeyword, part.start)?)
                }
                SyntaxKind::EqualsToken => assign = Some(self.offset(part.start)),
                found => {
                    return Err(TransformError::UnexpectedNode {
                        found,
                        parent: NodeKind::DefaultXmlNamespaceStatement,
                    })
                }
            }
        }
        Ok(DefaultXmlNamespaceStatement {
            range: self.range_of(cst),
            default_keyword: self.keyword(SyntaxKind::DefaultKeyword, cst.children[0].start)?,
            xml_keyword: self.keyword(SyntaxKind::XmlKeyword, cst.children[1].start)?,
            namespace_keyword,
            assign,
            value: self.transform_expression(value_cst, inner)?,
            semicolon: self.find(SyntaxKind::SemicolonToken, value_cst.after(), cst.after()),
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn declarators(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<Vec<VariableDeclarator>> {
        cst.children
            .iter()
            .map(|declarator| self.declarator(declarator, parent))
            .collect()
    }

    /// `name` or `name = initializer`.
    fn declarator(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<VariableDeclarator> {
        match cst.kind {
            SyntaxKind::Identifier => {
                let name = self.identifier(cst, parent)?;
                Ok(VariableDeclarator {
                    range: name.range,
                    name,
                    assign: None,
                    initializer: None,
                })
            }
            SyntaxKind::EqualsToken => {
                let inner = parent.enter(NodeKind::VariableDeclarator);
                let name_cst = child(cst, 0, "name")?;
                let value_cst = child(cst, 1, "initializer")?;
                Ok(VariableDeclarator {
                    range: self.range_of(cst),
                    name: self.identifier(name_cst, inner)?,
                    assign: self.find(SyntaxKind::EqualsToken, name_cst.after(), value_cst.start),
                    initializer: Some(self.transform_expression(value_cst, inner)?),
                })
            }
            found => Err(TransformError::UnexpectedNode {
                found,
                parent: parent.parent,
            }),
        }
    }

    /// `var a, b = 1` without its terminator.
    fn variable_declaration(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<VariableDeclaration> {
        let inner = parent.enter(NodeKind::VariableDeclaration);
        Ok(VariableDeclaration {
            range: self.range_of(cst),
            var_keyword: self.keyword(SyntaxKind::VarKeyword, cst.start)?,
            declarations: self.declarators(cst, inner)?,
            commas: self.commas(&cst.children)?,
        })
    }

    fn function(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Function> {
        let inner = parent.enter(NodeKind::Function);
        let function_keyword = self.keyword(SyntaxKind::FunctionKeyword, cst.start)?;
        let (name_cst, rest) = match cst.children.split_first() {
            Some((first, rest)) if first.kind == SyntaxKind::Identifier => (Some(first), rest),
            _ => (None, cst.children.as_slice()),
        };
        let (params_cst, body_cst) = match rest {
            [params, body] => (params, body),
            _ => {
                return Err(TransformError::MissingChild {
                    parent: cst.kind,
                    what: "parameter list",
                })
            }
        };
        let name = name_cst
            .map(|name| self.identifier(name, inner))
            .transpose()?;
        let list = self.argument_list(params_cst, |param| self.identifier(param, inner))?;
        Ok(Function {
            range: self.range_of(cst),
            function_keyword,
            name,
            lp: list.lp,
            arguments: list.items,
            commas: list.commas,
            rp: list.rp,
            body: self.block(body_cst, inner)?,
        })
    }

    fn identifier(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Identifier> {
        if cst.kind != SyntaxKind::Identifier {
            return Err(TransformError::UnexpectedNode {
                found: cst.kind,
                parent: parent.parent,
            });
        }
        Ok(Identifier {
            range: self.leaf_range(cst),
            name: cst.text().to_string(),
        })
    }

    /// A parenthesized, comma separated `Arguments` node.
    fn argument_list<T>(
        &self,
        cst: &CstNode,
        mut lower: impl FnMut(&CstNode) -> TransformResult<T>,
    ) -> TransformResult<ArgumentList<T>> {
        if cst.kind != SyntaxKind::Arguments {
            return Err(TransformError::MissingChild {
                parent: cst.kind,
                what: "argument list",
            });
        }
        let until = cst.after();
        let first_start = cst.children.first().map_or(until, |item| item.start);
        let lp = self.find_index(SyntaxKind::OpenParenToken, cst.start, first_start);
        let items = cst
            .children
            .iter()
            .map(&mut lower)
            .collect::<TransformResult<Vec<_>>>()?;
        let content_end = match cst.children.last() {
            Some(last) => last.after(),
            None => lp.map_or(cst.start, |index| index + 1),
        };
        Ok(ArgumentList {
            lp: lp.map(|index| self.offset(index)),
            items,
            commas: self.commas(&cst.children)?,
            rp: self.find(SyntaxKind::CloseParenToken, content_end, until),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// On the stack once per nesting level: every arm's call produces the
    /// return value directly.
    fn transform_expression(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        self.guard(parent)?;
        trace!(kind = %cst.kind, depth = parent.depth, "expression");
        match cst.kind {
            SyntaxKind::Expr => self.wrapped_expression(cst, parent),
            SyntaxKind::AsteriskToken if cst.child_count() == 1 => {
                self.transform_expression(&cst.children[0], parent)
            }
            SyntaxKind::AsteriskToken if cst.children.is_empty() => self.leaf_expression(cst, parent),
            SyntaxKind::XmlAttribute
            | SyntaxKind::DecimalLiteral
            | SyntaxKind::HexIntegerLiteral
            | SyntaxKind::OctalIntegerLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::RegularExpressionLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::ThisKeyword => self.leaf_expression(cst, parent),
            SyntaxKind::Identifier => self.identifier(cst, parent).map(Expression::Identifier),
            SyntaxKind::Paren => self.parenthesized(cst, parent),
            SyntaxKind::CommaExpr => self.comma(cst, parent),
            SyntaxKind::Call => self.call(cst, parent),
            SyntaxKind::ByField | SyntaxKind::DotDotToken | SyntaxKind::ColonColonToken => {
                self.selector(cst, parent)
            }
            SyntaxKind::ByIndex => self.array_item(cst, parent),
            SyntaxKind::NewKeyword => self.new_expression(cst, parent),
            SyntaxKind::QuestionToken => self.conditional(cst, parent),
            SyntaxKind::DeleteKeyword
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::YieldKeyword => self.keyword_operation(cst, parent),
            SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::UnaryPlus
            | SyntaxKind::UnaryMinus => self.unary(cst, parent, false),
            SyntaxKind::PostIncrement | SyntaxKind::PostDecrement => self.unary(cst, parent, true),
            SyntaxKind::ArrayLiteral => self.array(cst, parent),
            SyntaxKind::ObjectLiteral => self.object(cst, parent),
            SyntaxKind::FunctionKeyword => self.function(cst, parent).map(Expression::Function),
            SyntaxKind::VarKeyword => self.variable_declaration(cst, parent).map(Expression::Variable),
            SyntaxKind::XmlLiteral => self.xml_literal(cst, parent),
            kind if is_binary_operator(kind) => self.binary(cst, parent),
            found => Err(TransformError::UnexpectedNode {
                found,
                parent: parent.parent,
            }),
        }
    }

    /// Literals, `this`, `null`, `*` and `@attribute`.
    fn leaf_expression(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let range = self.leaf_range(cst);
        let expression = match cst.kind {
            SyntaxKind::XmlAttribute => Expression::XmlAttribute(XmlAttributeIdentifier {
                range,
                name: cst.text().to_string(),
            }),
            SyntaxKind::AsteriskToken => Expression::Asterisk(AsteriskExpression { range }),
            SyntaxKind::DecimalLiteral
            | SyntaxKind::HexIntegerLiteral
            | SyntaxKind::OctalIntegerLiteral => self.literal(cst, LiteralKind::Decimal),
            SyntaxKind::StringLiteral => self.literal(cst, LiteralKind::String),
            SyntaxKind::RegularExpressionLiteral => self.literal(cst, LiteralKind::RegExp),
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                self.literal(cst, LiteralKind::Boolean)
            }
            SyntaxKind::NullKeyword => Expression::Null(NullExpression { range }),
            SyntaxKind::ThisKeyword => Expression::This(ThisExpression {
                range,
                this_keyword: self.keyword(SyntaxKind::ThisKeyword, cst.start)?,
            }),
            found => {
                return Err(TransformError::UnexpectedNode {
                    found,
                    parent: parent.parent,
                })
            }
        };
        Ok(expression)
    }

    /// An `Expr` wrapper: its single child, or an empty expression at its position.
    fn wrapped_expression(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        match cst.children.as_slice() {
            [] => Ok(Expression::empty_at(self.offset(cst.start))),
            [inner] => self.transform_expression(inner, parent),
            _ => Err(TransformError::UnexpectedNode {
                found: cst.kind,
                parent: parent.parent,
            }),
        }
    }

    fn literal(&self, cst: &CstNode, kind: LiteralKind) -> Expression {
        Expression::Literal(Literal {
            range: self.leaf_range(cst),
            kind,
            text: cst.text().to_string(),
        })
    }

    fn binary(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::BinaryOperation);
        let left_cst = child(cst, 0, "left operand")?;
        let right_cst = child(cst, 1, "right operand")?;
        let operator_position = self.operator(cst.kind, left_cst.after(), right_cst.start)?;
        let left = self.transform_expression(left_cst, inner)?;
        let right = self.transform_expression(right_cst, inner)?;
        Ok(Expression::Binary(BinaryOperation {
            range: Self::span(left.range().start, right.range().end),
            operator: cst.kind,
            operator_position,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn unary(&self, cst: &CstNode, parent: Ancestry, postfix: bool) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::UnaryOperation);
        let operand_cst = child(cst, 0, "operand")?;
        let operator_position = if postfix {
            self.operator(cst.kind, operand_cst.after(), cst.after())?
        } else {
            self.operator(cst.kind, cst.start, operand_cst.start)?
        };
        Ok(Expression::Unary(UnaryOperation {
            range: self.range_of(cst),
            operator: cst.kind,
            operator_position,
            expression: Box::new(self.transform_expression(operand_cst, inner)?),
        }))
    }

    /// `delete x`, `typeof x`, `void x` and `yield [x]`.
    fn keyword_operation(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<Expression> {
        let keyword = self.keyword(cst.kind, cst.start)?;
        let inner = parent.enter(match cst.kind {
            SyntaxKind::DeleteKeyword => NodeKind::DeleteExpression,
            SyntaxKind::TypeOfKeyword => NodeKind::TypeOfExpression,
            SyntaxKind::VoidKeyword => NodeKind::VoidExpression,
            _ => NodeKind::YieldExpression,
        });
        let expression = match cst.child(0) {
            Some(operand) => self.transform_expression(operand, inner)?,
            None if cst.kind == SyntaxKind::YieldKeyword => Expression::empty_at(keyword.range.end),
            None => {
                return Err(TransformError::MissingChild {
                    parent: cst.kind,
                    what: "operand",
                })
            }
        };
        Ok(Expression::KeywordOperation(KeywordOperation {
            range: self.range_of(cst),
            keyword,
            expression: Box::new(expression),
        }))
    }

    fn new_expression(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::NewExpression);
        Ok(Expression::New(NewExpression {
            range: self.range_of(cst),
            new_keyword: self.keyword(SyntaxKind::NewKeyword, cst.start)?,
            object_class: Box::new(self.transform_expression(child(cst, 0, "class")?, inner)?),
        }))
    }

    fn call(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::CallExpression);
        let callee_cst = child(cst, 0, "callee")?;
        let arguments_cst = child(cst, 1, "arguments")?;
        let expression = self.transform_expression(callee_cst, inner)?;
        let list = self.argument_list(arguments_cst, |argument| {
            self.transform_expression(argument, inner)
        })?;
        Ok(Expression::Call(CallExpression {
            range: self.range_of(cst),
            expression: Box::new(expression),
            lp: list.lp,
            arguments: list.items,
            commas: list.commas,
            rp: list.rp,
        }))
    }

    /// `a.b`, `a..b` and `a::b`.
    fn selector(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let (node_kind, token) = match cst.kind {
            SyntaxKind::ByField => (NodeKind::PropertyExpression, SyntaxKind::DotToken),
            SyntaxKind::DotDotToken => (NodeKind::GetAllChildrenExpression, SyntaxKind::DotDotToken),
            _ => (NodeKind::GetLocalNameExpression, SyntaxKind::ColonColonToken),
        };
        let inner = parent.enter(node_kind);
        let object_cst = child(cst, 0, "object")?;
        let property_cst = child(cst, 1, "property")?;
        let position = self.require(token, object_cst.after(), property_cst.start)?;
        let range = self.range_of(cst);
        let object = Box::new(self.transform_expression(object_cst, inner)?);
        let property = Box::new(self.transform_expression(property_cst, inner)?);
        Ok(match cst.kind {
            SyntaxKind::ByField => Expression::Property(PropertyExpression {
                range,
                object,
                dot: position,
                property,
            }),
            SyntaxKind::DotDotToken => Expression::GetAllChildren(GetAllChildrenExpression {
                range,
                object,
                dot_dot: position,
                property,
            }),
            _ => Expression::GetLocalName(GetLocalNameExpression {
                range,
                namespace: object,
                colon_colon: position,
                local_name: property,
            }),
        })
    }

    fn array_item(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::GetArrayItemExpression);
        let array_cst = child(cst, 0, "array")?;
        let index_cst = child(cst, 1, "index")?;
        Ok(Expression::ArrayItem(GetArrayItemExpression {
            range: self.range_of(cst),
            array: Box::new(self.transform_expression(array_cst, inner)?),
            lb: self.find(SyntaxKind::OpenBracketToken, array_cst.after(), index_cst.start),
            index: Box::new(self.transform_expression(index_cst, inner)?),
            rb: self.find(SyntaxKind::CloseBracketToken, index_cst.after(), cst.after()),
        }))
    }

    fn conditional(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::ConditionalExpression);
        let condition_cst = child(cst, 0, "condition")?;
        let true_cst = child(cst, 1, "true branch")?;
        let false_cst = child(cst, 2, "false branch")?;
        Ok(Expression::Conditional(ConditionalExpression {
            range: self.range_of(cst),
            condition: Box::new(self.transform_expression(condition_cst, inner)?),
            question: self.require(SyntaxKind::QuestionToken, condition_cst.after(), true_cst.start)?,
            true_value: Box::new(self.transform_expression(true_cst, inner)?),
            colon: self.find(SyntaxKind::ColonToken, true_cst.after(), false_cst.start),
            false_value: Box::new(self.transform_expression(false_cst, inner)?),
        }))
    }

    fn parenthesized(
        &self,
        cst: &CstNode,
        parent: Ancestry,
    ) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::ParenthesizedExpression);
        let expression_cst = child(cst, 0, "expression")?;
        Ok(Expression::Parenthesized(ParenthesizedExpression {
            range: self.range_of(cst),
            lp: self.require(SyntaxKind::OpenParenToken, cst.start, cst.start + 1)?,
            expression: Box::new(self.transform_expression(expression_cst, inner)?),
            rp: self.find(SyntaxKind::CloseParenToken, expression_cst.after(), cst.after()),
        }))
    }

    fn comma(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::CommaExpression);
        Ok(Expression::Comma(CommaExpression {
            range: self.range_of(cst),
            items: cst
                .children
                .iter()
                .map(|item| self.transform_expression(item, inner))
                .collect::<TransformResult<Vec<_>>>()?,
            commas: self.commas(&cst.children)?,
        }))
    }

    /// `[a, , b]`. Holes become empty expressions at their comma.
    fn array(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::ArrayInitializer);
        let lb = self.require(SyntaxKind::OpenBracketToken, cst.start, cst.start + 1)?;
        let items = cst
            .children
            .iter()
            .map(|item| match item.children.first() {
                Some(value) => self.transform_expression(value, inner),
                None => Ok(Expression::empty_at(self.offset(item.start))),
            })
            .collect::<TransformResult<Vec<_>>>()?;
        let content_end = cst.children.last().map_or(cst.start + 1, CstNode::after);
        Ok(Expression::Array(ArrayInitializer {
            range: self.range_of(cst),
            lb,
            items,
            commas: self.commas(&cst.children)?,
            rb: self.find(SyntaxKind::CloseBracketToken, content_end, cst.after()),
        }))
    }

    fn object(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::ObjectInitializer);
        let lc_index = self
            .find_index(SyntaxKind::OpenBraceToken, cst.start, cst.start + 1)
            .ok_or(TransformError::TokenNotFound {
                kind: SyntaxKind::OpenBraceToken,
                start: cst.start,
                stop: cst.start,
            })?;
        let initializers = cst
            .children
            .iter()
            .map(|member| self.object_member(member, inner))
            .collect::<TransformResult<Vec<_>>>()?;
        let content_end = cst.children.last().map_or(lc_index + 1, CstNode::after);
        let rc_index = self.find_index(SyntaxKind::CloseBraceToken, content_end, cst.after());
        let line_of = |index: usize| self.tokens().get(index).map(|token| token.line);
        let multiline = rc_index.map_or(false, |rc| line_of(rc) != line_of(lc_index));
        Ok(Expression::Object(ObjectInitializer {
            range: self.range_of(cst),
            lc: self.offset(lc_index),
            initializers,
            commas: self.commas(&cst.children)?,
            rc: rc_index.map(|index| self.offset(index)),
            multiline,
        }))
    }

    fn object_member(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<ObjectMember> {
        match cst.kind {
            SyntaxKind::PropertyInit => {
                let inner = parent.enter(NodeKind::PropertyInitializer);
                let name_cst = child(cst, 0, "name")?;
                let value_cst = child(cst, 1, "value")?;
                Ok(ObjectMember::Property(PropertyInitializer {
                    range: self.range_of(cst),
                    name: self.transform_expression(name_cst, inner)?,
                    colon: self.find(SyntaxKind::ColonToken, name_cst.after(), value_cst.start),
                    value: self.transform_expression(value_cst, inner)?,
                }))
            }
            SyntaxKind::GetKeyword => {
                let inner = parent.enter(NodeKind::GetMethod);
                let name_cst = child(cst, 0, "name")?;
                let body_cst = child(cst, 1, "body")?;
                let lp = self.find_index(SyntaxKind::OpenParenToken, name_cst.after(), body_cst.start);
                let rp_from = lp.map_or(name_cst.after(), |index| index + 1);
                Ok(ObjectMember::Get(GetMethod {
                    range: self.range_of(cst),
                    get_keyword: self.keyword(SyntaxKind::GetKeyword, cst.start)?,
                    name: self.transform_expression(name_cst, inner)?,
                    lp: lp.map(|index| self.offset(index)),
                    rp: self.find(SyntaxKind::CloseParenToken, rp_from, body_cst.start),
                    body: self.block(body_cst, inner)?,
                }))
            }
            SyntaxKind::SetKeyword => {
                let inner = parent.enter(NodeKind::SetMethod);
                let name_cst = child(cst, 0, "name")?;
                let argument_cst = child(cst, 1, "argument")?;
                let body_cst = child(cst, 2, "body")?;
                Ok(ObjectMember::Set(SetMethod {
                    range: self.range_of(cst),
                    set_keyword: self.keyword(SyntaxKind::SetKeyword, cst.start)?,
                    name: self.transform_expression(name_cst, inner)?,
                    lp: self.find(SyntaxKind::OpenParenToken, name_cst.after(), argument_cst.start),
                    argument: self.identifier(argument_cst, inner)?,
                    rp: self.find(SyntaxKind::CloseParenToken, argument_cst.after(), body_cst.start),
                    body: self.block(body_cst, inner)?,
                }))
            }
            found => Err(TransformError::UnexpectedNode {
                found,
                parent: NodeKind::ObjectInitializer,
            }),
        }
    }

    /// Fragments are lowered in source order whatever order the CST holds them in.
    fn xml_literal(&self, cst: &CstNode, parent: Ancestry) -> TransformResult<Expression> {
        let inner = parent.enter(NodeKind::XmlLiteral);
        let mut parts: Vec<&CstNode> = cst.children.iter().collect();
        // Stable: equal bounds keep arrival order.
        parts.sort_by_key(|part| (part.start, part.real_stop()));
        let fragments = parts
            .into_iter()
            .map(|part| match part.kind {
                SyntaxKind::XmlFragment | SyntaxKind::XmlFragmentEnd => {
                    Ok(XmlFragment::Text(XmlTextFragment {
                        range: self.leaf_range(part),
                        xml: part.text().to_string(),
                    }))
                }
                _ => {
                    let expression =
                        self.transform_expression(part, inner.enter(NodeKind::XmlExpressionFragment))?;
                    Ok(XmlFragment::Expression(XmlExpressionFragment {
                        range: expression.range(),
                        expression,
                    }))
                }
            })
            .collect::<TransformResult<Vec<_>>>()?;
        Ok(Expression::Xml(XmlLiteral {
            range: self.range_of(cst),
            fragments,
        }))
    }
}

/// The parts of a parenthesized list.
struct ArgumentList<T> {
    lp: Option<TextPos>,
    items: Vec<T>,
    commas: Vec<TextPos>,
    rp: Option<TextPos>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: SyntaxKind, text: &str, index: usize) -> Token {
        Token::new(kind, text, 1, 0, index)
    }

    #[test]
    fn test_missing_tree_gives_empty_script() {
        let tokens = vec![token(SyntaxKind::Identifier, "abc", 0)];
        let offsets = OffsetMap::build(&tokens);
        let script = Transformer::new(&tokens, &offsets, 512).transform(None).unwrap();
        assert!(script.is_empty());
        assert_eq!(script.range, TextRange::new(0, 3));
    }

    #[test]
    fn test_rejects_non_script_root() {
        let tokens = vec![token(SyntaxKind::Identifier, "a", 0)];
        let offsets = OffsetMap::build(&tokens);
        let root = CstNode::leaf(SyntaxKind::Identifier, 0, "a");
        let err = Transformer::new(&tokens, &offsets, 512)
            .transform(Some(&root))
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::UnexpectedNode {
                found: SyntaxKind::Identifier,
                parent: NodeKind::Script
            }
        );
    }

    #[test]
    fn test_depth_guard() {
        // `((a))` with a limit of one level below the statement.
        let tokens = vec![
            token(SyntaxKind::OpenParenToken, "(", 0),
            token(SyntaxKind::OpenParenToken, "(", 1),
            token(SyntaxKind::Identifier, "a", 2),
            token(SyntaxKind::CloseParenToken, ")", 3),
            token(SyntaxKind::CloseParenToken, ")", 4),
        ];
        let offsets = OffsetMap::build(&tokens);
        let inner = CstNode::new(SyntaxKind::Paren, 1, Some(3))
            .with_children(vec![CstNode::leaf(SyntaxKind::Identifier, 2, "a")]);
        let outer = CstNode::new(SyntaxKind::Paren, 0, Some(4)).with_children(vec![inner]);
        let root = CstNode::new(SyntaxKind::Script, 0, Some(4)).with_children(vec![outer]);

        let err = Transformer::new(&tokens, &offsets, 2)
            .transform(Some(&root))
            .unwrap_err();
        assert_eq!(err, TransformError::TooDeep { limit: 2 });
        assert!(Transformer::new(&tokens, &offsets, 3).transform(Some(&root)).is_ok());
    }

    #[test]
    fn test_depth_guard_on_default_stack() {
        let levels = 1000;
        let mut tokens = Vec::new();
        for i in 0..levels {
            tokens.push(token(SyntaxKind::OpenParenToken, "(", i));
        }
        tokens.push(token(SyntaxKind::Identifier, "a", levels));
        for i in 0..levels {
            tokens.push(token(SyntaxKind::CloseParenToken, ")", levels + 1 + i));
        }
        let offsets = OffsetMap::build(&tokens);
        let last = 2 * levels;

        let mut node = CstNode::leaf(SyntaxKind::Identifier, levels, "a");
        for i in (0..levels).rev() {
            node = CstNode::new(SyntaxKind::Paren, i, Some(last - i)).with_children(vec![node]);
        }
        let root = CstNode::new(SyntaxKind::Script, 0, Some(last)).with_children(vec![node]);

        let err = Transformer::new(&tokens, &offsets, 512)
            .transform(Some(&root))
            .unwrap_err();
        assert_eq!(err, TransformError::TooDeep { limit: 512 });
    }

    #[test]
    fn test_unknown_tag_in_expression() {
        let tokens = vec![token(SyntaxKind::CommaToken, ",", 0)];
        let offsets = OffsetMap::build(&tokens);
        let stray = CstNode::leaf(SyntaxKind::CommaToken, 0, ",");
        let root = CstNode::new(SyntaxKind::Script, 0, Some(0)).with_children(vec![stray]);
        let err = Transformer::new(&tokens, &offsets, 512)
            .transform(Some(&root))
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::UnexpectedNode {
                found: SyntaxKind::CommaToken,
                parent: NodeKind::ExpressionStatement
            }
        );
    }

    #[test]
    fn test_postfix_operator_found_through_fallback() {
        let tokens = vec![
            token(SyntaxKind::Identifier, "i", 0),
            token(SyntaxKind::PlusPlusToken, "++", 1),
        ];
        let offsets = OffsetMap::build(&tokens);
        let increment = CstNode::new(SyntaxKind::PostIncrement, 0, Some(1))
            .with_children(vec![CstNode::leaf(SyntaxKind::Identifier, 0, "i")]);
        let root = CstNode::new(SyntaxKind::Script, 0, Some(1)).with_children(vec![increment]);
        let script = Transformer::new(&tokens, &offsets, 512)
            .transform(Some(&root))
            .unwrap();
        let Statement::Expression(statement) = &script.statements[0] else {
            panic!("expected an expression statement");
        };
        let Expression::Unary(unary) = &statement.expression else {
            panic!("expected a unary operation");
        };
        assert_eq!(unary.operator, SyntaxKind::PostIncrement);
        assert_eq!(unary.operator_position, 1);
        assert!(unary.is_postfix());
        assert_eq!(unary.range, TextRange::new(0, 3));
    }
}
