//! jsfront_scanner: Tokenizer for JavaScript source text.
//!
//! Produces the full-fidelity token list consumed by the grammar and the
//! offset map, with support for:
//! - ES3 tokens plus `const`, `yield` and the contextual keywords
//! - Decimal, hexadecimal and octal numeric literals
//! - Regular expression literals, told apart from division by context
//! - E4X literals with embedded expressions
//! - Unicode identifiers

mod char_codes;
mod scanner;

pub use scanner::Scanner;

use jsfront_diagnostics::DiagnosticCollection;
use jsfront_syntax::Token;
use tracing::debug;

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Recognize E4X literals after `<` in operand position.
    pub xml_literals: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { xml_literals: true }
    }
}

impl ScanOptions {
    pub fn with_xml_literals(mut self, xml_literals: bool) -> Self {
        self.xml_literals = xml_literals;
        self
    }
}

/// The tokenizer's output: every token of the source plus lexical diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub diagnostics: DiagnosticCollection,
}

/// Tokenize `source` with default options.
pub fn tokenize(source: &str) -> Tokenized {
    tokenize_with_options(source, ScanOptions::default())
}

/// Tokenize `source`. Never fails; lexical problems become diagnostics.
pub fn tokenize_with_options(source: &str, options: ScanOptions) -> Tokenized {
    let (tokens, diagnostics) = Scanner::new(source, options).scan_all();
    debug!(
        tokens = tokens.len(),
        errors = diagnostics.error_count(),
        "tokenized source"
    );
    Tokenized {
        tokens,
        diagnostics,
    }
}
