//! jsfront_diagnostics: Diagnostic messages and problem reporting.
//!
//! Diagnostics carry a message template, a code, a category and, when known,
//! the source span and line of the problem. They flow to a [`ProblemReporter`]
//! supplied by the host; when no reporter is given they are dropped.

use jsfront_core::text::TextSpan;
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code.
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The source text span where this diagnostic occurred, if any.
    pub span: Option<TextSpan>,
    /// The 0-based line of the span start, if any.
    pub line: Option<u32>,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            span: None,
            line: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a new diagnostic with span and line info.
    pub fn with_location(
        span: TextSpan,
        line: u32,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            span: Some(span),
            line: Some(line),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// Start offset of the span, or 0 for global diagnostics.
    pub fn start(&self) -> u32 {
        self.span.map(|s| s.start).unwrap_or(0)
    }

    /// End offset of the span, or 0 for global diagnostics.
    pub fn end(&self) -> u32 {
        self.span.map(|s| s.end()).unwrap_or(0)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "({}", line + 1)?;
            if let Some(span) = self.span {
                write!(f, ", {}", span)?;
            }
            write!(f, "): ")?;
        }
        write!(
            f,
            "{} JS{}: {}",
            self.category, self.code, self.message_text
        )
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A sink for problems found while parsing.
pub trait ProblemReporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A collection of diagnostics accumulated during a parse.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Forward every collected diagnostic to a reporter, leaving this collection empty.
    pub fn drain_into(&mut self, reporter: &mut dyn ProblemReporter) {
        for diagnostic in self.diagnostics.drain(..) {
            reporter.report(diagnostic);
        }
    }
}

impl ProblemReporter for DiagnosticCollection {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1001, Error, "Invalid character");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1003, Error, "'*/' expected");
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: DiagnosticMessage = diag!(1004, Error, "Unterminated regular expression literal");
    pub const UNTERMINATED_XML_LITERAL: DiagnosticMessage = diag!(1005, Error, "Unterminated XML literal");

    // ========================================================================
    // Recognition errors (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_0: DiagnosticMessage = diag!(1100, Error, "Unexpected {0}");
    pub const MISMATCHED_INPUT_0_1_EXPECTED: DiagnosticMessage = diag!(1101, Error, "Mismatched input {0}, {1} expected");
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1102, Error, "{0} expected");
    pub const MISMATCHED_INPUT_0_EXPECTING_SET_1: DiagnosticMessage = diag!(1103, Error, "Mismatched input {0} expecting set {1}");
    pub const NESTING_EXCEEDS_0_LEVELS: DiagnosticMessage = diag!(1104, Error, "Nesting exceeds {0} levels");

    // ========================================================================
    // Internal errors (1200-1299)
    // ========================================================================
    pub const FAILED_TO_BUILD_SYNTAX_TREE_0: DiagnosticMessage = diag!(1200, Error, "Failed to build syntax tree: {0}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message("Mismatched input {0}, {1} expected", &["'x'", "')'"]);
        assert_eq!(msg, "Mismatched input 'x', ')' expected");
    }

    #[test]
    fn test_format_message_no_args() {
        let msg = format_message("Invalid character", &[]);
        assert_eq!(msg, "Invalid character");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_location(
            TextSpan::new(10, 1),
            2,
            &messages::UNEXPECTED_0,
            &["'}'"],
        );
        let display = format!("{}", diag);
        assert!(display.starts_with("(3, [10, 11))"));
        assert!(display.contains("JS1100"));
        assert!(display.contains("Unexpected '}'"));
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::new(&messages::FAILED_TO_BUILD_SYNTAX_TREE_0, &["boom"]);
        assert!(diag.span.is_none());
        assert!(diag.line.is_none());
        assert_eq!(diag.code, 1200);
        assert_eq!(diag.start(), 0);
        assert!(diag.is_error());
        assert_eq!(diag.message_text, "Failed to build syntax tree: boom");
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);

        collection.add(Diagnostic::new(&messages::INVALID_CHARACTER, &[]));
        let warning = DiagnosticMessage {
            code: 9999,
            category: DiagnosticCategory::Warning,
            message: "just a warning",
        };
        collection.add(Diagnostic::new(&warning, &[]));
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_drain_into_reporter() {
        let mut source = DiagnosticCollection::new();
        source.add(Diagnostic::new(&messages::INVALID_CHARACTER, &[]));
        let mut sink = DiagnosticCollection::new();
        source.drain_into(&mut sink);
        assert!(source.is_empty());
        assert_eq!(sink.len(), 1);
    }
}
