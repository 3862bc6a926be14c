//! Comment extraction.

use crate::offsets::OffsetMap;
use jsfront_ast::{Comment, CommentKind};
use jsfront_core::text::TextRange;
use jsfront_syntax::{SyntaxKind, Token};

/// Every comment token, in token order.
pub fn collect_comments(tokens: &[Token], offsets: &OffsetMap) -> Vec<Comment> {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(index, token)| {
            let kind = match token.kind {
                SyntaxKind::SingleLineComment => CommentKind::SingleLine,
                SyntaxKind::MultiLineComment => CommentKind::MultiLine,
                _ => return None,
            };
            Some(Comment {
                range: TextRange::at(offsets.offset(index), token.len()),
                text: token.text.clone(),
                kind,
            })
        })
        .collect()
}
