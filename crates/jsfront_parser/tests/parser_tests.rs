//! Parser integration tests.
//!
//! Parses real source end to end and checks the ranges and punctuation
//! offsets of the resulting AST, plus the structural properties every tree
//! must satisfy.

use jsfront_ast::{children, walk, AstNode, Expression, NodeKind, ObjectMember, Script, Statement, SwitchClause, Walk, XmlFragment};
use jsfront_core::text::{LineMap, TextRange};
use jsfront_diagnostics::DiagnosticCollection;
use jsfront_grammar::Grammar;
use jsfront_parser::{parse, parse_with_options, transform, OffsetMap, ParseOptions};
use jsfront_scanner::tokenize;
use rayon::prelude::*;

/// Helper: parse and collect every reported diagnostic.
fn parse_reporting(source: &str) -> (Script, DiagnosticCollection) {
    let mut diagnostics = DiagnosticCollection::new();
    let script = parse(source, Some(&mut diagnostics));
    (script, diagnostics)
}

/// Helper: parse source that must be clean.
fn parse_clean(source: &str) -> Script {
    let (script, diagnostics) = parse_reporting(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        diagnostics.diagnostics()
    );
    script
}

/// Helper: the expression of the only top-level statement.
fn single_expression(source: &str) -> Expression {
    let script = parse_clean(source);
    assert_eq!(script.statements.len(), 1, "{:?}", script);
    match script.statements.into_iter().next() {
        Some(Statement::Expression(statement)) => statement.expression,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

/// Helper: the right side of `x = ...`.
fn assigned_value(source: &str) -> Expression {
    match single_expression(source) {
        Expression::Binary(assignment) => *assignment.right,
        other => panic!("expected an assignment, got {:?}", other),
    }
}

fn text(source: &str, range: TextRange) -> &str {
    &source[range.to_range()]
}

const CORPUS: &[&str] = &[
    "",
    "x",
    "a + b * c - d;",
    "var a = 1, b, c = a ? b : 2;\nconst K = 3;",
    "function f(a, b) { return a + b; }\nf(1, 2);",
    "if (a) { b(); } else if (c) d(); else { }",
    "for (var i = 0; i < 10; i++) { continue; }",
    "for (;;) break;",
    "for (k in o) {} for each (var v in o) v;",
    "do { x--; } while (x > 0);",
    "while (true) { if (x) break outer; }",
    "switch (v) { case 1: a(); break; case 2: default: b(); }",
    "try { t(); } catch (e if e instanceof E) { } catch (e) { } finally { f(); }",
    "outer: for (;;) { throw new Error('x'); }",
    "with (o) { p = q; }",
    "x = [1, , 2, ]; y = { a: 1, 'b': [], 3: c, get g() { return 1; }, set s(v) { } };",
    "o.p.q[r](s)..t.@u; ns::name; x.*;",
    "delete o.p; void 0; typeof x; !a; ~b; -c; +d; ++e; --f; g++; h--;",
    "x = function (a) { yield a; yield; };",
    "a = b += c -= d, e;",
    "x = <a>{b}<c/>{d}</a>;",
    "default xml namespace = 'http://example.com';",
    "/* lead */ a; // tail\n/** doc */ function g() {}",
    "x = /re+/g.test(s) ? 0x1F : 017;",
    "a\n;\nb",
];

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_expression_statement_takes_its_semicolon() {
    let script = parse_clean("f()");
    let Statement::Expression(statement) = &script.statements[0] else {
        panic!("expected an expression statement");
    };
    assert_eq!(statement.range, TextRange::new(0, 3));
    assert_eq!(statement.semicolon, None);

    let script = parse_clean("f();");
    let Statement::Expression(statement) = &script.statements[0] else {
        panic!("expected an expression statement");
    };
    assert_eq!(statement.range, TextRange::new(0, 4));
    assert_eq!(statement.semicolon, Some(3));
    assert_eq!(statement.expression.range(), TextRange::new(0, 3));

    let script = parse_clean("f() ;");
    let Statement::Expression(statement) = &script.statements[0] else {
        panic!("expected an expression statement");
    };
    assert_eq!(statement.semicolon, Some(4));
    assert_eq!(statement.range, TextRange::new(0, 5));
}

#[test]
fn test_var_is_an_expression_statement() {
    let source = "var a = 1, b;";
    let script = parse_clean(source);
    let Statement::Expression(statement) = &script.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Variable(declaration) = &statement.expression else {
        panic!("expected a variable declaration");
    };
    assert_eq!(text(source, declaration.range), "var a = 1, b");
    assert_eq!(declaration.declarations.len(), 2);
    assert_eq!(declaration.declarations[0].assign, Some(6));
    assert_eq!(declaration.commas, vec![9]);
    assert_eq!(statement.semicolon, Some(12));
}

#[test]
fn test_const_statement() {
    let source = "const A = 1, B = 2;";
    let script = parse_clean(source);
    let Statement::Const(constant) = &script.statements[0] else {
        panic!("expected a const statement");
    };
    assert_eq!(constant.range, TextRange::new(0, 19));
    assert_eq!(constant.const_keyword.text(), "const");
    assert_eq!(constant.declarations.len(), 2);
    assert_eq!(constant.semicolon, Some(18));
}

#[test]
fn test_function_declaration_and_expression() {
    let source = "function f(a, b) {}";
    let script = parse_clean(source);
    let Statement::Function(function) = &script.statements[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(function.name.as_ref().map(|name| name.name.as_str()), Some("f"));
    assert_eq!(function.lp, Some(10));
    assert_eq!(function.commas, vec![12]);
    assert_eq!(function.rp, Some(15));
    assert_eq!(function.body.lc, Some(17));
    assert_eq!(function.body.rc, Some(18));
    assert_eq!(function.range, TextRange::new(0, 19));

    let Expression::Parenthesized(paren) = single_expression("(function () {});") else {
        panic!("expected a parenthesized expression");
    };
    let Expression::Function(function) = *paren.expression else {
        panic!("expected a function expression");
    };
    assert!(function.name.is_none());
    assert!(function.arguments.is_empty());
}

#[test]
fn test_if_else_positions() {
    let source = "if (a) b; else c;";
    let script = parse_clean(source);
    let Statement::If(statement) = &script.statements[0] else {
        panic!("expected an if statement");
    };
    assert_eq!(statement.lp, Some(3));
    assert_eq!(statement.rp, Some(5));
    assert_eq!(
        statement.else_keyword.as_ref().map(|keyword| keyword.range),
        Some(TextRange::new(10, 14))
    );
    assert_eq!(statement.then_statement.range(), TextRange::new(7, 9));
    assert_eq!(statement.range, TextRange::new(0, 17));
}

#[test]
fn test_empty_for_clauses_sit_at_their_terminators() {
    let source = "for (;;) x;";
    let script = parse_clean(source);
    let Statement::For(statement) = &script.statements[0] else {
        panic!("expected a for statement");
    };
    assert!(statement.initial.is_empty());
    assert_eq!(statement.initial.range(), TextRange::empty(5));
    assert_eq!(statement.condition.range(), TextRange::empty(6));
    assert_eq!(statement.step.range(), TextRange::empty(7));
    assert_eq!(statement.initial_semicolon, Some(5));
    assert_eq!(statement.condition_semicolon, Some(6));
    assert_eq!(statement.rp, Some(7));
}

#[test]
fn test_for_each_in() {
    let source = "for each (var v in list) v;";
    let script = parse_clean(source);
    let Statement::ForIn(statement) = &script.statements[0] else {
        panic!("expected a for-in statement");
    };
    assert!(statement.is_for_each());
    assert_eq!(statement.in_keyword.range, TextRange::new(16, 18));
    assert!(matches!(statement.item, Expression::Variable(_)));
    assert_eq!(text(source, statement.iterator.range()), "list");
}

#[test]
fn test_switch_clauses() {
    let source = "switch (v) { case 1: a(); default: b(); }";
    let script = parse_clean(source);
    let Statement::Switch(statement) = &script.statements[0] else {
        panic!("expected a switch statement");
    };
    assert_eq!(statement.lc, Some(11));
    assert_eq!(statement.rc, Some(40));
    assert_eq!(statement.clauses.len(), 2);
    let SwitchClause::Case(case) = &statement.clauses[0] else {
        panic!("expected a case clause");
    };
    assert_eq!(case.colon, Some(19));
    assert_eq!(case.statements.len(), 1);
    assert!(matches!(statement.clauses[1], SwitchClause::Default(_)));
}

#[test]
fn test_out_of_order_switch_clauses_are_sorted() {
    let source = "switch (v) { case 1: a(); default: b(); }";
    let tokens = tokenize(source).tokens;
    let line_map = LineMap::new(source);
    let mut cst = Grammar::new(&tokens, &line_map).parse_program().unwrap();
    let switch = &mut cst.children[0];
    switch.children[1..].reverse();
    assert_eq!(switch.children[1].kind, jsfront_syntax::SyntaxKind::DefaultKeyword);

    let script = transform(Some(&cst), &tokens, &ParseOptions::default()).unwrap();
    let Statement::Switch(statement) = &script.statements[0] else {
        panic!("expected a switch statement");
    };
    assert!(matches!(statement.clauses[0], SwitchClause::Case(_)));
    assert!(matches!(statement.clauses[1], SwitchClause::Default(_)));
    assert!(statement.clauses[0].range().start < statement.clauses[1].range().start);
}

#[test]
fn test_try_catch_finally() {
    let source = "try {} catch (e if e) {} catch (f) {} finally {}";
    let script = parse_clean(source);
    let Statement::Try(statement) = &script.statements[0] else {
        panic!("expected a try statement");
    };
    assert_eq!(statement.catches.len(), 2);
    let filtered = &statement.catches[0];
    assert_eq!(filtered.exception.name, "e");
    assert!(filtered.filter.is_some());
    assert_eq!(filtered.rp, Some(20));
    assert!(statement.catches[1].filter.is_none());
    assert!(statement.finally.is_some());
    assert_eq!(statement.range, TextRange::new(0, source.len() as u32));
}

#[test]
fn test_labelled_jump() {
    let source = "l: while (1) break l;";
    let script = parse_clean(source);
    let Statement::Labelled(labelled) = &script.statements[0] else {
        panic!("expected a labelled statement");
    };
    assert_eq!(labelled.label.text, "l");
    assert_eq!(labelled.colon, Some(1));
    let Statement::While(body) = &*labelled.statement else {
        panic!("expected a while statement");
    };
    let Statement::Jump(jump) = &*body.body else {
        panic!("expected a jump statement");
    };
    assert!(jump.is_break());
    assert_eq!(jump.label.as_ref().map(|label| label.text.as_str()), Some("l"));
    assert_eq!(jump.semicolon, Some(20));
}

#[test]
fn test_default_xml_namespace() {
    let source = "default xml namespace = 'u';";
    let script = parse_clean(source);
    let Statement::DefaultXmlNamespace(statement) = &script.statements[0] else {
        panic!("expected a default xml namespace statement");
    };
    assert!(statement.namespace_keyword.is_some());
    assert_eq!(statement.assign, Some(22));
    assert_eq!(text(source, statement.value.range()), "'u'");
    assert_eq!(statement.semicolon, Some(27));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_retagged_operators_are_located() {
    let Expression::Unary(increment) = single_expression("i++;") else {
        panic!("expected a unary operation");
    };
    assert!(increment.is_postfix());
    assert_eq!(increment.operator_position, 1);
    assert_eq!(increment.range, TextRange::new(0, 3));

    let Expression::Unary(plus) = single_expression("+a;") else {
        panic!("expected a unary operation");
    };
    assert_eq!(plus.operator, jsfront_syntax::SyntaxKind::UnaryPlus);
    assert_eq!(plus.operator_position, 0);

    let Expression::Binary(assignment) = single_expression("x = y - -z;") else {
        panic!("expected an assignment");
    };
    let Expression::Binary(subtraction) = *assignment.right else {
        panic!("expected a subtraction");
    };
    assert_eq!(subtraction.operator_position, 6);
    let Expression::Unary(negation) = *subtraction.right else {
        panic!("expected a negation");
    };
    assert_eq!(negation.operator_position, 8);
}

#[test]
fn test_binary_range_spans_operands() {
    let Expression::Binary(addition) = single_expression("a  +  b;") else {
        panic!("expected a binary operation");
    };
    assert_eq!(addition.operator_text(), "+");
    assert_eq!(addition.operator_position, 3);
    assert_eq!(addition.range, TextRange::new(0, 7));
}

#[test]
fn test_array_holes() {
    let source = "x = [a, , b];";
    let Expression::Array(array) = assigned_value(source) else {
        panic!("expected an array");
    };
    assert_eq!(array.lb, 4);
    assert_eq!(array.items.len(), 3);
    assert!(array.items[1].is_empty());
    assert_eq!(array.items[1].range(), TextRange::empty(8));
    assert_eq!(array.commas, vec![6, 8]);
    assert_eq!(array.rb, Some(11));
}

#[test]
fn test_object_literal_members() {
    let source = "x = {a: 1, get b() {}, set c(v) {}};";
    let Expression::Object(object) = assigned_value(source) else {
        panic!("expected an object");
    };
    assert!(!object.multiline);
    assert_eq!(object.initializers.len(), 3);
    let ObjectMember::Property(property) = &object.initializers[0] else {
        panic!("expected a property");
    };
    assert_eq!(property.colon, Some(6));
    let ObjectMember::Get(getter) = &object.initializers[1] else {
        panic!("expected a getter");
    };
    assert_eq!(text(source, getter.name.range()), "b");
    assert_eq!(getter.lp, Some(16));
    let ObjectMember::Set(setter) = &object.initializers[2] else {
        panic!("expected a setter");
    };
    assert_eq!(setter.argument.name, "v");
    assert_eq!(object.commas.len(), 2);

    let Expression::Object(object) = assigned_value("x = {\n  a: 1\n};") else {
        panic!("expected an object");
    };
    assert!(object.multiline);
}

#[test]
fn test_member_access_and_calls() {
    let source = "o.p[i](a, b);";
    let Expression::Call(call) = single_expression(source) else {
        panic!("expected a call");
    };
    assert_eq!(call.lp, Some(6));
    assert_eq!(call.commas, vec![8]);
    assert_eq!(call.rp, Some(11));
    let Expression::ArrayItem(item) = *call.expression else {
        panic!("expected an index");
    };
    assert_eq!(item.lb, Some(3));
    assert_eq!(item.rb, Some(5));
    let Expression::Property(property) = *item.array else {
        panic!("expected a property access");
    };
    assert_eq!(property.dot, 1);
}

#[test]
fn test_e4x_selectors() {
    let Expression::Property(property) = single_expression("x..y.@id;") else {
        panic!("expected a property access");
    };
    assert!(matches!(*property.property, Expression::XmlAttribute(_)));
    let Expression::GetAllChildren(descendants) = *property.object else {
        panic!("expected a descendant access");
    };
    assert_eq!(descendants.dot_dot, 1);

    let Expression::GetLocalName(name) = single_expression("ns::n;") else {
        panic!("expected a qualified name");
    };
    assert_eq!(name.colon_colon, 2);

    let Expression::Property(wildcard) = single_expression("x.*;") else {
        panic!("expected a property access");
    };
    assert!(matches!(*wildcard.property, Expression::Asterisk(_)));
}

#[test]
fn test_xml_fragments() {
    let source = "x = <a>{b}</a>;";
    let Expression::Xml(xml) = assigned_value(source) else {
        panic!("expected an XML literal");
    };
    assert_eq!(xml.fragments.len(), 3);
    let XmlFragment::Text(open) = &xml.fragments[0] else {
        panic!("expected a text fragment");
    };
    assert_eq!(open.xml, "<a>");
    let XmlFragment::Expression(embedded) = &xml.fragments[1] else {
        panic!("expected an expression fragment");
    };
    assert_eq!(text(source, embedded.range), "b");
    assert!(matches!(xml.fragments[2], XmlFragment::Text(_)));
}

#[test]
fn test_bare_yield_has_empty_operand() {
    let source = "x = function () { yield; };";
    let Expression::Function(function) = assigned_value(source) else {
        panic!("expected a function");
    };
    let Statement::Expression(statement) = &function.body.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::KeywordOperation(operation) = &statement.expression else {
        panic!("expected a keyword operation");
    };
    assert_eq!(operation.keyword.text(), "yield");
    assert_eq!(operation.expression.range(), TextRange::empty(23));
}

// ============================================================================
// Script, comments and failure
// ============================================================================

#[test]
fn test_root_covers_source_and_comments_attach_in_order() {
    let source = "// head\nvar a = 1; /* mid */ a++;\n";
    let script = parse_clean(source);
    assert_eq!(script.range, TextRange::new(0, source.len() as u32));
    assert_eq!(script.statements.len(), 2);
    assert_eq!(script.comments.len(), 2);
    assert_eq!(text(source, script.comments[0].range), "// head");
    assert_eq!(text(source, script.comments[1].range), "/* mid */");

    let kinds: Vec<NodeKind> = children(&script).iter().map(|node| node.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Comment,
            NodeKind::ExpressionStatement,
            NodeKind::Comment,
            NodeKind::ExpressionStatement
        ]
    );
}

#[test]
fn test_empty_source() {
    let script = parse_clean("");
    assert!(script.is_empty());
    assert_eq!(script.range, TextRange::new(0, 0));
}

#[test]
fn test_recoverable_errors_still_build_a_tree() {
    let (script, diagnostics) = parse_reporting("a = ;");
    assert!(diagnostics.has_errors());
    assert!(diagnostics.diagnostics().iter().all(|d| d.code != 1200));
    let Statement::Expression(statement) = &script.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Binary(assignment) = &statement.expression else {
        panic!("expected an assignment");
    };
    assert!(assignment.right.is_empty());
    assert_eq!(statement.semicolon, Some(4));
}

#[test]
fn test_excessive_nesting_gives_empty_script() {
    for depth in [600, 5000] {
        let source = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        let (script, diagnostics) = parse_reporting(&source);

        assert!(script.is_empty());
        assert_eq!(script.range, TextRange::new(0, source.len() as u32));
        let codes: Vec<u32> = diagnostics.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1104, 1200], "{} parens", depth);
        assert!(diagnostics.diagnostics()[1]
            .message_text
            .starts_with("Failed to build syntax tree: nesting exceeds 200 levels"));
    }
}

#[test]
fn test_long_operator_chain_hits_tree_depth_limit() {
    let source = format!("x = a{};", " + a".repeat(600));
    let (script, diagnostics) = parse_reporting(&source);

    assert!(script.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.diagnostics()[0].code, 1200);
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Failed to build syntax tree: nesting exceeds 512 levels"
    );

    let shorter = format!("x = a{};", " + a".repeat(400));
    assert_eq!(parse_clean(&shorter).statements.len(), 1);
}

#[test]
fn test_nesting_limit_is_configurable() {
    let source = format!("{}a{}", "(".repeat(150), ")".repeat(150));
    assert_eq!(parse_clean(&source).statements.len(), 1);

    let mut diagnostics = DiagnosticCollection::new();
    let options = ParseOptions::default().with_max_nesting_depth(100);
    let script = parse_with_options(&source, &options, Some(&mut diagnostics));
    assert!(script.is_empty());
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Failed to build syntax tree: nesting exceeds 100 levels"
    );
}

#[test]
fn test_transform_without_tree() {
    let tokens = tokenize("a /* b */").tokens;
    let script = transform(None, &tokens, &ParseOptions::default()).unwrap();
    assert!(script.statements.is_empty());
    assert_eq!(script.range, TextRange::new(0, 9));
}

// ============================================================================
// Properties over a corpus
// ============================================================================

#[test]
fn test_offset_map_matches_token_text() {
    for source in CORPUS {
        let tokens = tokenize(source).tokens;
        let offsets = OffsetMap::build(&tokens);
        assert_eq!(offsets.source_len() as usize, source.len());
        for (index, token) in tokens.iter().enumerate() {
            let start = offsets.offset(index) as usize;
            assert_eq!(&source[start..start + token.len()], token.text, "{:?}", source);
        }
    }
}

#[test]
fn test_every_node_nests_inside_its_parent() {
    for source in CORPUS {
        let script = parse_clean(source);
        assert_eq!(script.range, TextRange::new(0, source.len() as u32));
        walk(&script, &mut |node: &dyn AstNode| {
            let range = node.range();
            assert!(range.start <= range.end, "{:?} in {:?}", node.kind(), source);
            let mut previous_end = None;
            for child in children(node) {
                let inner = child.range();
                assert!(
                    range.covers(inner),
                    "{:?} {:?} escapes {:?} {:?} in {:?}",
                    child.kind(),
                    inner,
                    node.kind(),
                    range,
                    source
                );
                if child.kind() == NodeKind::Comment {
                    continue;
                }
                if let Some(previous) = previous_end {
                    assert!(previous <= inner.start, "siblings overlap in {:?}", source);
                }
                previous_end = Some(inner.end);
            }
            Walk::Continue
        });
    }
}

#[test]
fn test_parallel_parses_are_identical() {
    let sequential: Vec<Script> = CORPUS.iter().map(|source| parse(source, None)).collect();
    let parallel: Vec<Script> = CORPUS.par_iter().map(|source| parse(source, None)).collect();
    assert_eq!(sequential, parallel);
}
