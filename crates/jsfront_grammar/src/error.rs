//! Fatal grammar errors.

use thiserror::Error;

/// An error that stops CST construction. Ordinary syntax errors are
/// diagnostics, not `SyntaxError`s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("nesting exceeds {limit} levels at token {index}")]
    TooDeep { limit: u32, index: usize },
}
