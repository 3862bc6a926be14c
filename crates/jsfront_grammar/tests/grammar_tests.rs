//! Grammar integration tests.
//!
//! Tokenizes real source with the scanner and checks the shape and token
//! bounds of the resulting concrete syntax tree, plus error recovery.

use jsfront_core::text::LineMap;
use jsfront_diagnostics::DiagnosticCollection;
use jsfront_grammar::{Grammar, SyntaxError, MAX_RECURSION_DEPTH};
use jsfront_scanner::tokenize;
use jsfront_syntax::{CstNode, SyntaxKind, Token};

struct Parsed {
    tokens: Vec<Token>,
    script: CstNode,
    diagnostics: DiagnosticCollection,
}

/// Helper: tokenize and build the tree, expecting no fatal error.
fn parse(source: &str) -> Parsed {
    let tokenized = tokenize(source);
    let line_map = LineMap::new(source);
    let mut grammar = Grammar::new(&tokenized.tokens, &line_map);
    let script = grammar.parse_program().expect("grammar should not fail");
    let diagnostics = grammar.take_diagnostics();
    Parsed {
        tokens: tokenized.tokens,
        script,
        diagnostics,
    }
}

/// Helper: the single top-level statement of a clean parse.
fn parse_one(source: &str) -> (Vec<Token>, CstNode) {
    let parsed = parse(source);
    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        parsed.diagnostics.diagnostics()
    );
    assert_eq!(parsed.script.children.len(), 1, "{:?}", parsed.script);
    let node = parsed.script.children.into_iter().next().unwrap();
    (parsed.tokens, node)
}

fn kinds(node: &CstNode) -> Vec<SyntaxKind> {
    node.children.iter().map(|c| c.kind).collect()
}

/// Helper: the source text a node's own bounds cover.
fn covered(tokens: &[Token], node: &CstNode) -> String {
    match node.stop {
        Some(stop) => tokens[node.start..=stop].iter().map(|t| t.text.as_str()).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_empty_program() {
    let parsed = parse("");
    assert_eq!(parsed.script.kind, SyntaxKind::Script);
    assert!(parsed.script.children.is_empty());
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_expression_statement_excludes_semicolon() {
    let (tokens, node) = parse_one("f();");
    assert_eq!(node.kind, SyntaxKind::Call);
    assert_eq!(covered(&tokens, &node), "f()");
}

#[test]
fn test_var_excludes_semicolon_const_includes_it() {
    let (tokens, node) = parse_one("var a = 1, b;");
    assert_eq!(node.kind, SyntaxKind::VarKeyword);
    assert_eq!(kinds(&node), vec![SyntaxKind::EqualsToken, SyntaxKind::Identifier]);
    assert_eq!(covered(&tokens, &node), "var a = 1, b");

    let (tokens, node) = parse_one("const c = 2;");
    assert_eq!(node.kind, SyntaxKind::ConstKeyword);
    assert_eq!(covered(&tokens, &node), "const c = 2;");
}

#[test]
fn test_if_else() {
    let (_, node) = parse_one("if (a) b(); else { c(); }");
    assert_eq!(node.kind, SyntaxKind::IfKeyword);
    assert_eq!(
        kinds(&node),
        vec![SyntaxKind::Identifier, SyntaxKind::Call, SyntaxKind::Block]
    );
}

#[test]
fn test_for_steps_with_omitted_parts() {
    let (tokens, node) = parse_one("for (;;) {}");
    assert_eq!(node.kind, SyntaxKind::ForKeyword);
    let head = &node.children[0];
    assert_eq!(head.kind, SyntaxKind::ForStep);
    for part in &head.children {
        assert_eq!(part.kind, SyntaxKind::Expr);
        assert!(part.is_empty());
    }
    // Each omitted part sits at the token that follows it.
    assert_eq!(tokens[head.children[0].start].text, ";");
    assert_eq!(tokens[head.children[2].start].text, ")");
}

#[test]
fn test_for_in_and_for_each() {
    let (_, node) = parse_one("for (var k in o) f(k);");
    assert_eq!(node.children[0].kind, SyntaxKind::ForIter);
    assert_eq!(node.children[0].children[0].kind, SyntaxKind::VarKeyword);

    let (_, node) = parse_one("for each (v in o) f(v);");
    assert_eq!(node.kind, SyntaxKind::ForEach);
}

#[test]
fn test_for_init_does_not_take_in() {
    let (_, node) = parse_one("for (i = 0; i < n; i++) {}");
    assert_eq!(node.children[0].kind, SyntaxKind::ForStep);

    let (_, node) = parse_one("for (x = a in b) {}");
    let head = &node.children[0];
    assert_eq!(head.kind, SyntaxKind::ForIter);
    assert_eq!(head.children[0].kind, SyntaxKind::EqualsToken);
}

#[test]
fn test_switch_clauses() {
    let (_, node) = parse_one("switch (x) { case 1: a(); break; default: b(); }");
    assert_eq!(
        kinds(&node),
        vec![SyntaxKind::Identifier, SyntaxKind::CaseKeyword, SyntaxKind::DefaultKeyword]
    );
    assert_eq!(
        kinds(&node.children[1]),
        vec![SyntaxKind::DecimalLiteral, SyntaxKind::Call, SyntaxKind::BreakKeyword]
    );
}

#[test]
fn test_try_with_conditional_catch() {
    let (_, node) = parse_one("try {} catch (e if e.x) {} catch (e) {} finally {}");
    assert_eq!(
        kinds(&node),
        vec![
            SyntaxKind::Block,
            SyntaxKind::CatchKeyword,
            SyntaxKind::CatchKeyword,
            SyntaxKind::FinallyKeyword
        ]
    );
    assert_eq!(
        kinds(&node.children[1]),
        vec![SyntaxKind::Identifier, SyntaxKind::IfKeyword, SyntaxKind::Block]
    );
}

#[test]
fn test_function_declaration() {
    let (tokens, node) = parse_one("function add(a, b) { return a + b; }");
    assert_eq!(
        kinds(&node),
        vec![SyntaxKind::Identifier, SyntaxKind::Arguments, SyntaxKind::Block]
    );
    assert_eq!(covered(&tokens, &node.children[1]), "(a, b)");
}

#[test]
fn test_labelled_break() {
    let (_, node) = parse_one("outer: while (1) break outer;");
    assert_eq!(node.kind, SyntaxKind::Labelled);
    let body = &node.children[1];
    assert_eq!(body.children[1].kind, SyntaxKind::BreakKeyword);
    assert_eq!(kinds(&body.children[1]), vec![SyntaxKind::Identifier]);
}

#[test]
fn test_return_line_break_restriction() {
    let parsed = parse("function f() { return\n1; }");
    let body = &parsed.script.children[0].children[2];
    assert_eq!(kinds(body), vec![SyntaxKind::ReturnKeyword, SyntaxKind::DecimalLiteral]);
    assert!(body.children[0].children.is_empty());
}

#[test]
fn test_default_xml_namespace() {
    let (_, node) = parse_one("default xml namespace = \"http://x\";");
    assert_eq!(node.kind, SyntaxKind::DefaultXmlNamespace);
    assert_eq!(node.children.last().map(|c| c.kind), Some(SyntaxKind::StringLiteral));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_binary_precedence() {
    let (_, node) = parse_one("a + b * c;");
    assert_eq!(node.kind, SyntaxKind::PlusToken);
    assert_eq!(node.children[1].kind, SyntaxKind::AsteriskToken);

    let (_, node) = parse_one("a - b - c;");
    assert_eq!(node.kind, SyntaxKind::MinusToken);
    assert_eq!(node.children[0].kind, SyntaxKind::MinusToken);
}

#[test]
fn test_assignment_is_right_associative() {
    let (_, node) = parse_one("a = b += c;");
    assert_eq!(node.kind, SyntaxKind::EqualsToken);
    assert_eq!(node.children[1].kind, SyntaxKind::PlusEqualsToken);
}

#[test]
fn test_unary_and_postfix_tags() {
    let (_, node) = parse_one("-a;");
    assert_eq!(node.kind, SyntaxKind::UnaryMinus);
    let (_, node) = parse_one("+a;");
    assert_eq!(node.kind, SyntaxKind::UnaryPlus);
    let (_, node) = parse_one("a++;");
    assert_eq!(node.kind, SyntaxKind::PostIncrement);
    let (_, node) = parse_one("--a;");
    assert_eq!(node.kind, SyntaxKind::MinusMinusToken);
    let (_, node) = parse_one("typeof a;");
    assert_eq!(node.kind, SyntaxKind::TypeOfKeyword);
}

#[test]
fn test_postfix_needs_same_line() {
    let parsed = parse("a\n++b");
    assert_eq!(
        kinds(&parsed.script),
        vec![SyntaxKind::Identifier, SyntaxKind::PlusPlusToken]
    );
}

#[test]
fn test_member_chain() {
    let (_, node) = parse_one("a.b[c](d);");
    assert_eq!(node.kind, SyntaxKind::Call);
    assert_eq!(node.children[0].kind, SyntaxKind::ByIndex);
    assert_eq!(node.children[0].children[0].kind, SyntaxKind::ByField);
}

#[test]
fn test_new_with_and_without_arguments() {
    let (_, node) = parse_one("new Foo(1);");
    assert_eq!(node.kind, SyntaxKind::NewKeyword);
    assert_eq!(node.children[0].kind, SyntaxKind::Call);

    let (_, node) = parse_one("new Foo;");
    assert_eq!(node.children[0].kind, SyntaxKind::Identifier);

    let (_, node) = parse_one("new a.b().c;");
    assert_eq!(node.kind, SyntaxKind::ByField);
    assert_eq!(node.children[0].kind, SyntaxKind::NewKeyword);
}

#[test]
fn test_conditional_and_comma() {
    let (_, node) = parse_one("a ? b : c, d;");
    assert_eq!(node.kind, SyntaxKind::CommaExpr);
    assert_eq!(node.children[0].kind, SyntaxKind::QuestionToken);
}

#[test]
fn test_array_holes_sit_on_commas() {
    let (tokens, node) = parse_one("[1, , 2,];");
    assert_eq!(node.kind, SyntaxKind::ArrayLiteral);
    assert_eq!(node.children.len(), 3);
    let hole = &node.children[1];
    assert!(hole.is_empty());
    assert_eq!(tokens[hole.start].text, ",");
}

#[test]
fn test_object_literal_with_accessors() {
    let (_, node) = parse_one("x = { a: 1, 'b': 2, get c() { return 3; }, set c(v) {} };");
    let object = &node.children[1];
    assert_eq!(object.kind, SyntaxKind::ObjectLiteral);
    assert_eq!(
        kinds(object),
        vec![
            SyntaxKind::PropertyInit,
            SyntaxKind::PropertyInit,
            SyntaxKind::GetKeyword,
            SyntaxKind::SetKeyword
        ]
    );
    // `get` on its own is an ordinary property name.
    let (_, node) = parse_one("x = { get: 1 };");
    assert_eq!(node.children[1].children[0].kind, SyntaxKind::PropertyInit);
}

#[test]
fn test_contextual_keywords_are_identifiers() {
    let (_, node) = parse_one("each + namespace;");
    assert_eq!(
        kinds(&node),
        vec![SyntaxKind::Identifier, SyntaxKind::Identifier]
    );
}

#[test]
fn test_e4x_selectors() {
    let (_, node) = parse_one("x..item.@id;");
    assert_eq!(node.kind, SyntaxKind::ByField);
    assert_eq!(node.children[0].kind, SyntaxKind::DotDotToken);
    assert_eq!(node.children[1].kind, SyntaxKind::XmlAttribute);

    let (_, node) = parse_one("ns::name;");
    assert_eq!(node.kind, SyntaxKind::ColonColonToken);
}

#[test]
fn test_xml_literal_with_embedded_expression() {
    let (_, node) = parse_one("x = <a>{v}</a>;");
    let xml = &node.children[1];
    assert_eq!(xml.kind, SyntaxKind::XmlLiteral);
    assert_eq!(
        kinds(xml),
        vec![SyntaxKind::XmlFragment, SyntaxKind::Identifier, SyntaxKind::XmlFragmentEnd]
    );
}

// ============================================================================
// Recovery
// ============================================================================

#[test]
fn test_missing_operand_yields_empty_expr() {
    let parsed = parse("a = ;");
    assert!(parsed.diagnostics.has_errors());
    let assignment = &parsed.script.children[0];
    assert_eq!(assignment.kind, SyntaxKind::EqualsToken);
    assert_eq!(assignment.children[1].kind, SyntaxKind::Expr);
    assert!(assignment.children[1].is_empty());
    // right after `=`, inside the assignment's bounds
    assert_eq!(assignment.children[1].start, 3);
}

#[test]
fn test_extraneous_token_is_deleted() {
    let parsed = parse("if (a b) c();");
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics.diagnostics()[0].message_text, "Unexpected 'b'");
    let statement = &parsed.script.children[0];
    assert_eq!(statement.kind, SyntaxKind::IfKeyword);
    assert_eq!(statement.children[1].kind, SyntaxKind::Call);
}

#[test]
fn test_stray_close_brace_is_skipped() {
    let parsed = parse("a(); } b();");
    assert_eq!(parsed.diagnostics.error_count(), 1);
    assert_eq!(kinds(&parsed.script), vec![SyntaxKind::Call, SyntaxKind::Call]);
}

#[test]
fn test_missing_close_paren_at_end() {
    let parsed = parse("f(1");
    let diagnostic = &parsed.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.message_text, "')' expected");
    // Reported on the last token of the input.
    assert_eq!(diagnostic.start(), 2);
}

#[test]
fn test_missing_semicolon_between_statements() {
    let parsed = parse("a b");
    assert_eq!(
        parsed.diagnostics.diagnostics()[0].message_text,
        "Mismatched input 'b', ';' expected"
    );
    assert_eq!(kinds(&parsed.script), vec![SyntaxKind::Identifier, SyntaxKind::Identifier]);
}

#[test]
fn test_invalid_character_is_retried() {
    let parsed = parse("x = #1;");
    let assignment = &parsed.script.children[0];
    assert_eq!(assignment.children[1].kind, SyntaxKind::DecimalLiteral);
}

/// Helper: build the tree on the current thread, returning the fatal error if any.
fn parse_result(source: &str) -> Result<CstNode, SyntaxError> {
    let tokenized = tokenize(source);
    let line_map = LineMap::new(source);
    let mut grammar = Grammar::new(&tokenized.tokens, &line_map);
    grammar.parse_program()
}

#[test]
fn test_deep_nesting_is_fatal() {
    for depth in [600, 5000] {
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let tokenized = tokenize(&source);
        let line_map = LineMap::new(&source);
        let mut grammar = Grammar::new(&tokenized.tokens, &line_map);
        let result = grammar.parse_program();
        assert!(
            matches!(result, Err(SyntaxError::TooDeep { limit: MAX_RECURSION_DEPTH, .. })),
            "{} parens",
            depth
        );
        let diagnostics = grammar.take_diagnostics();
        assert_eq!(diagnostics.diagnostics()[0].message_text, "Nesting exceeds 200 levels");
    }
}

#[test]
fn test_every_nesting_form_is_bounded() {
    let sources = [
        format!("{}{}", "{".repeat(4000), "}".repeat(4000)),
        format!("x = {}1{};", "[".repeat(4000), "]".repeat(4000)),
        format!("x = {}1{};", "f(".repeat(4000), ")".repeat(4000)),
        format!("x = {}1;", "!".repeat(4000)),
        format!("x = {}X;", "new ".repeat(4000)),
        format!("x = {}1;", "a = ".repeat(4000)),
        format!("{}{}", "if (a) ".repeat(4000), "b;"),
        format!("x = {}1{};", "{a: ".repeat(4000), "}".repeat(4000)),
    ];
    for source in &sources {
        assert!(
            matches!(parse_result(source), Err(SyntaxError::TooDeep { .. })),
            "{:?}",
            &source[..16]
        );
    }
}

#[test]
fn test_nesting_under_the_limit_parses() {
    let source = format!("{}1{}", "(".repeat(190), ")".repeat(190));
    let script = parse_result(&source).unwrap();
    assert_eq!(script.children[0].kind, SyntaxKind::Paren);
}
