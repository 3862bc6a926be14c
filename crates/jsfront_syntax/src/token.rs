//! Tokens produced by the scanner.

use crate::SyntaxKind;

bitflags::bitflags! {
    /// Per-token scanner flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenFlags: u8 {
        const NONE                 = 0;
        /// A line terminator appears between the previous significant token and this one.
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// The literal or comment ran into end of input before it was closed.
        const UNTERMINATED         = 1 << 1;
    }
}

/// A scanned token.
///
/// Tokens carry a 1-based line and a 0-based column, measured in bytes from
/// the start of the line. Flat offsets are recovered from these through the
/// offset map, never stored on the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// The exact source text of the token.
    pub text: String,
    /// 1-based line of the first character.
    pub line: u32,
    /// 0-based byte column of the first character.
    pub column: u32,
    /// Position of this token in the full token list, hidden tokens included.
    pub index: usize,
    pub flags: TokenFlags,
}

impl Token {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, line: u32, column: u32, index: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            index,
            flags: TokenFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The length of this token in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this token has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether this token is whitespace, a line terminator or a comment.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.kind.is_hidden()
    }

    /// Whether there was a line break before this token.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Whether the token was cut short by end of input.
    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.flags.contains(TokenFlags::UNTERMINATED)
    }

    /// The token text quoted for use in a diagnostic, e.g. `'foo'`.
    pub fn quoted(&self) -> String {
        format!("'{}'", self.text)
    }
}
