//! jsfront_grammar: Recursive descent grammar producing a concrete syntax tree.
//!
//! Consumes the scanner's token list and builds a [`CstNode`] tree whose
//! nodes carry token index bounds into the full token list. Recognition errors are
//! recovered from and reported as diagnostics; only runaway nesting aborts.
//!
//! [`CstNode`]: jsfront_syntax::CstNode

mod error;
mod grammar;
mod precedence;

pub use error::SyntaxError;
pub use grammar::{Grammar, MAX_RECURSION_DEPTH};
pub use precedence::{get_binary_operator_precedence, OperatorPrecedence};
