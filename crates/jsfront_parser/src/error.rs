//! Errors that abort building the syntax tree.

use jsfront_ast::NodeKind;
use jsfront_grammar::SyntaxError;
use jsfront_syntax::SyntaxKind;
use thiserror::Error;

/// The concrete tree does not have the shape the transformer requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("nesting exceeds {limit} levels")]
    TooDeep { limit: u32 },

    #[error("unexpected {found} node in {parent}")]
    UnexpectedNode { found: SyntaxKind, parent: NodeKind },

    #[error("{parent} node has no {what}")]
    MissingChild {
        parent: SyntaxKind,
        what: &'static str,
    },

    #[error("no {kind} token in tokens {start}..{stop}")]
    TokenNotFound {
        kind: SyntaxKind,
        start: usize,
        stop: usize,
    },
}

/// Any failure between the token list and the finished tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}
