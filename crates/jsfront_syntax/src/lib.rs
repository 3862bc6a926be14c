//! jsfront_syntax: Token and concrete syntax tree definitions.
//!
//! The scanner produces [`Token`]s, the grammar arranges them into a
//! [`CstNode`] tree whose nodes are tagged with a [`SyntaxKind`]. Token kinds
//! and grammar rule tags share one enum, so an operator production is simply
//! rooted at a node tagged with the operator's token kind.

pub mod cst;
pub mod syntax_kind;
pub mod token;

pub use cst::CstNode;
pub use syntax_kind::SyntaxKind;
pub use token::{Token, TokenFlags};
