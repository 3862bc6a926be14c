//! Token window search.
//!
//! Locates punctuation and keywords inside a bounded range of the token
//! list. The grammar does not keep a node per `(` or `,`, so their offsets
//! are recovered by scanning the tokens between two known children.

use crate::offsets::OffsetMap;
use jsfront_core::text::TextPos;
use jsfront_syntax::{SyntaxKind, Token};

/// Operator tags the grammar gives to nodes whose token has another kind,
/// paired with the kind of that token.
pub const OPERATOR_FALLBACKS: &[(SyntaxKind, SyntaxKind)] = &[
    (SyntaxKind::PostIncrement, SyntaxKind::PlusPlusToken),
    (SyntaxKind::PostDecrement, SyntaxKind::MinusMinusToken),
    (SyntaxKind::UnaryPlus, SyntaxKind::PlusToken),
    (SyntaxKind::UnaryMinus, SyntaxKind::MinusToken),
];

/// The token kind to retry with when no token of kind `observed` is found.
pub fn fallback_operator(observed: SyntaxKind) -> Option<SyntaxKind> {
    OPERATOR_FALLBACKS
        .iter()
        .find(|(from, _)| *from == observed)
        .map(|&(_, to)| to)
}

/// Bounded searches over a token list.
#[derive(Debug, Clone, Copy)]
pub struct TokenWindow<'t> {
    tokens: &'t [Token],
    offsets: &'t OffsetMap,
}

impl<'t> TokenWindow<'t> {
    pub fn new(tokens: &'t [Token], offsets: &'t OffsetMap) -> Self {
        Self { tokens, offsets }
    }

    #[inline]
    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    #[inline]
    pub fn offsets(&self) -> &'t OffsetMap {
        self.offsets
    }

    /// Index of the first token of `kind` in `[start, stop]`.
    pub fn find_index(&self, kind: SyntaxKind, start: usize, stop: usize) -> Option<usize> {
        self.find_nth_index(kind, start, stop, 0)
    }

    /// Index of the `(skip + 1)`-th token of `kind` in `[start, stop]`.
    /// `stop` is clamped to the last token; an inverted window is empty.
    pub fn find_nth_index(
        &self,
        kind: SyntaxKind,
        start: usize,
        stop: usize,
        skip: usize,
    ) -> Option<usize> {
        let stop = stop.min(self.tokens.len().checked_sub(1)?);
        if start > stop {
            return None;
        }
        self.tokens[start..=stop]
            .iter()
            .enumerate()
            .filter(|(_, token)| token.kind == kind)
            .nth(skip)
            .map(|(i, _)| start + i)
    }

    /// Offset of the first token of `kind` in `[start, stop]`.
    pub fn find_offset(&self, kind: SyntaxKind, start: usize, stop: usize) -> Option<TextPos> {
        self.find_nth_offset(kind, start, stop, 0)
    }

    /// Offset of the `(skip + 1)`-th token of `kind` in `[start, stop]`.
    pub fn find_nth_offset(
        &self,
        kind: SyntaxKind,
        start: usize,
        stop: usize,
        skip: usize,
    ) -> Option<TextPos> {
        self.find_nth_index(kind, start, stop, skip)
            .map(|index| self.offsets.offset(index))
    }

    /// First token of `kind` in `[start, stop]`, retrying with the fallback
    /// kind when the grammar retagged the operator.
    pub fn find_operator(&self, kind: SyntaxKind, start: usize, stop: usize) -> Option<usize> {
        self.find_index(kind, start, stop).or_else(|| {
            fallback_operator(kind).and_then(|fallback| self.find_index(fallback, start, stop))
        })
    }

    /// The first significant token in `[start, stop]`.
    pub fn next_significant(&self, start: usize, stop: usize) -> Option<usize> {
        let stop = stop.min(self.tokens.len().checked_sub(1)?);
        if start > stop {
            return None;
        }
        self.tokens[start..=stop]
            .iter()
            .position(|token| !token.is_hidden())
            .map(|i| start + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `f(a, b, c)` split into tokens, with spaces after the commas.
    fn call_tokens() -> Vec<Token> {
        let parts = [
            (SyntaxKind::Identifier, "f"),
            (SyntaxKind::OpenParenToken, "("),
            (SyntaxKind::Identifier, "a"),
            (SyntaxKind::CommaToken, ","),
            (SyntaxKind::WhiteSpace, " "),
            (SyntaxKind::Identifier, "b"),
            (SyntaxKind::CommaToken, ","),
            (SyntaxKind::WhiteSpace, " "),
            (SyntaxKind::Identifier, "c"),
            (SyntaxKind::CloseParenToken, ")"),
        ];
        let mut column = 0;
        parts
            .iter()
            .enumerate()
            .map(|(index, &(kind, text))| {
                let token = Token::new(kind, text, 1, column, index);
                column += text.len() as u32;
                token
            })
            .collect()
    }

    #[test]
    fn test_find_first_and_nth() {
        let tokens = call_tokens();
        let offsets = OffsetMap::build(&tokens);
        let window = TokenWindow::new(&tokens, &offsets);
        assert_eq!(window.find_offset(SyntaxKind::CommaToken, 0, 9), Some(3));
        assert_eq!(window.find_nth_offset(SyntaxKind::CommaToken, 0, 9, 1), Some(6));
        assert_eq!(window.find_nth_offset(SyntaxKind::CommaToken, 0, 9, 2), None);
        assert_eq!(window.find_index(SyntaxKind::CommaToken, 4, 9), Some(6));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let tokens = call_tokens();
        let offsets = OffsetMap::build(&tokens);
        let window = TokenWindow::new(&tokens, &offsets);
        assert_eq!(window.find_index(SyntaxKind::CommaToken, 3, 3), Some(3));
        assert_eq!(window.find_index(SyntaxKind::CloseParenToken, 0, 8), None);
        assert_eq!(window.find_index(SyntaxKind::CloseParenToken, 0, 100), Some(9));
        assert_eq!(window.find_index(SyntaxKind::Identifier, 5, 4), None);
    }

    #[test]
    fn test_empty_token_list() {
        let offsets = OffsetMap::build(&[]);
        let window = TokenWindow::new(&[], &offsets);
        assert_eq!(window.find_offset(SyntaxKind::CommaToken, 0, 0), None);
        assert_eq!(window.next_significant(0, 0), None);
    }

    #[test]
    fn test_fallback_table() {
        assert_eq!(
            fallback_operator(SyntaxKind::PostIncrement),
            Some(SyntaxKind::PlusPlusToken)
        );
        assert_eq!(fallback_operator(SyntaxKind::UnaryMinus), Some(SyntaxKind::MinusToken));
        assert_eq!(fallback_operator(SyntaxKind::PlusToken), None);
    }

    #[test]
    fn test_find_operator_retries_with_fallback() {
        let tokens = vec![
            Token::new(SyntaxKind::Identifier, "i", 1, 0, 0),
            Token::new(SyntaxKind::PlusPlusToken, "++", 1, 1, 1),
        ];
        let offsets = OffsetMap::build(&tokens);
        let window = TokenWindow::new(&tokens, &offsets);
        assert_eq!(window.find_index(SyntaxKind::PostIncrement, 0, 1), None);
        assert_eq!(window.find_operator(SyntaxKind::PostIncrement, 0, 1), Some(1));
        assert_eq!(window.find_operator(SyntaxKind::PostDecrement, 0, 1), None);
    }

    #[test]
    fn test_next_significant_skips_hidden() {
        let tokens = call_tokens();
        let offsets = OffsetMap::build(&tokens);
        let window = TokenWindow::new(&tokens, &offsets);
        assert_eq!(window.next_significant(4, 9), Some(5));
        assert_eq!(window.next_significant(7, 7), None);
    }
}
