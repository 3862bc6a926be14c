//! jsfront_parser: JavaScript source to span-annotated AST.
//!
//! Drives the scanner and the grammar, then lowers the concrete tree into a
//! [`Script`] whose every node carries a byte range into the source.
//! Recoverable syntax errors are reported and the tree is built anyway; if
//! the tree cannot be built at all the caller gets an empty script covering
//! the source plus one diagnostic saying why.

mod comments;
mod error;
mod offsets;
mod options;
mod transformer;
mod window;

pub use comments::collect_comments;
pub use error::{BuildError, TransformError};
pub use offsets::OffsetMap;
pub use options::ParseOptions;
pub use transformer::Transformer;
pub use window::{fallback_operator, TokenWindow, OPERATOR_FALLBACKS};

use jsfront_ast::Script;
use jsfront_core::LineMap;
use jsfront_diagnostics::{messages, Diagnostic, ProblemReporter};
use jsfront_grammar::Grammar;
use jsfront_scanner::{tokenize_with_options, ScanOptions};
use jsfront_syntax::{CstNode, Token};
use tracing::{debug, instrument, warn};

/// Parse `source` with default options.
pub fn parse(source: &str, reporter: Option<&mut dyn ProblemReporter>) -> Script {
    parse_with_options(source, &ParseOptions::default(), reporter)
}

/// Parse `source` into a script. Never fails: problems go to `reporter`.
#[instrument(skip_all, fields(len = source.len()))]
pub fn parse_with_options(
    source: &str,
    options: &ParseOptions,
    mut reporter: Option<&mut dyn ProblemReporter>,
) -> Script {
    let mut tokenized = tokenize_with_options(
        source,
        ScanOptions::default().with_xml_literals(options.xml_literals),
    );
    if let Some(reporter) = reporter.as_mut() {
        tokenized.diagnostics.drain_into(&mut **reporter);
    }
    let offsets = OffsetMap::build(&tokenized.tokens);
    debug!(tokens = tokenized.tokens.len(), "parsing");

    // Reborrow with a fresh trait-object lifetime; `reporter` is used again below.
    let build_reporter = reporter
        .as_mut()
        .map(|reporter| &mut **reporter as &mut dyn ProblemReporter);
    match build(source, &tokenized.tokens, &offsets, options, build_reporter) {
        Ok(script) => {
            debug!(statements = script.statements.len(), comments = script.comments.len(), "parsed");
            script
        }
        Err(err) => {
            warn!(error = %err, "could not build syntax tree");
            if let Some(reporter) = reporter {
                let message = err.to_string();
                reporter.report(Diagnostic::new(
                    &messages::FAILED_TO_BUILD_SYNTAX_TREE_0,
                    &[&message],
                ));
            }
            Script::empty(offsets.source_len())
        }
    }
}

fn build(
    source: &str,
    tokens: &[Token],
    offsets: &OffsetMap,
    options: &ParseOptions,
    reporter: Option<&mut dyn ProblemReporter>,
) -> Result<Script, BuildError> {
    let line_map = LineMap::new(source);
    let mut grammar = Grammar::new(tokens, &line_map);
    let cst = grammar.parse_program();
    if let Some(reporter) = reporter {
        grammar.take_diagnostics().drain_into(reporter);
    }
    let cst = cst?;
    let mut script = Transformer::new(tokens, offsets, options.max_nesting_depth).transform(Some(&cst))?;
    script.comments = collect_comments(tokens, offsets);
    Ok(script)
}

/// Lower an already built CST. `None` gives an empty script over the tokens.
pub fn transform(
    cst: Option<&CstNode>,
    tokens: &[Token],
    options: &ParseOptions,
) -> Result<Script, TransformError> {
    let offsets = OffsetMap::build(tokens);
    let mut script = Transformer::new(tokens, &offsets, options.max_nesting_depth).transform(cst)?;
    script.comments = collect_comments(tokens, &offsets);
    Ok(script)
}
