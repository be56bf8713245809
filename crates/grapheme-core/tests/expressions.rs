// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end parsing scenarios: literal inputs against their expected
//! trees or error messages.

use grapheme_core::ast::{NodeKind, StrSource};
use grapheme_core::prelude::*;

fn parse(source: &str) -> Node {
    parse_string(source, &ParseOptions::default())
        .unwrap_or_else(|e| panic!("{source:?} failed to parse:\n{e}"))
        .expect("non-empty input")
}

fn parse_err(source: &str) -> ParseError {
    match parse_string(source, &ParseOptions::default()) {
        Err(error) => error,
        Ok(root) => panic!("{source:?} unexpectedly parsed: {root:?}"),
    }
}

#[test]
fn power_of_variable() {
    let root = parse("x^2");
    let NodeKind::Operator { op, children, .. } = &root.kind else {
        panic!("expected operator, got {root:?}");
    };
    assert_eq!(op, "^");
    assert!(matches!(&children[0].kind, NodeKind::Variable { name } if name == "x"));
    assert!(matches!(&children[1].kind, NodeKind::Number { value } if value == "2"));
}

#[test]
fn vertical_bars_are_abs() {
    let root = parse("|x|");
    let NodeKind::Function {
        name,
        paren_info,
        children,
    } = &root.kind
    else {
        panic!("expected function, got {root:?}");
    };
    assert_eq!(name, "abs");
    assert!(paren_info.vertical_bar);
    assert_eq!(children.len(), 1);
}

#[test]
fn double_bars_are_nested_abs() {
    let root = parse("||x||");
    let NodeKind::Function { name, children, .. } = &root.kind else {
        panic!("expected function");
    };
    assert_eq!(name, "abs");
    let NodeKind::Function {
        name: inner,
        children: inner_children,
        ..
    } = &children[0].kind
    else {
        panic!("expected inner abs");
    };
    assert_eq!(inner, "abs");
    assert!(matches!(&inner_children[0].kind, NodeKind::Variable { name } if name == "x"));
}

#[test]
fn chained_comparison() {
    let root = parse("a < b < c");
    let NodeKind::Operator {
        op,
        implicit,
        children,
    } = &root.kind
    else {
        panic!("expected cchain, got {root:?}");
    };
    assert_eq!(op, "cchain");
    assert!(!implicit);
    assert_eq!(children.len(), 5);
    assert!(matches!(&children[0].kind, NodeKind::Variable { name } if name == "a"));
    assert!(matches!(
        &children[1].kind,
        NodeKind::Str { contents, src: StrSource::Operator, .. } if contents == "<"
    ));
    assert!(matches!(&children[2].kind, NodeKind::Variable { name } if name == "b"));
    assert!(matches!(
        &children[3].kind,
        NodeKind::Str { contents, src: StrSource::Operator, .. } if contents == "<"
    ));
    assert!(matches!(&children[4].kind, NodeKind::Variable { name } if name == "c"));
}

#[test]
fn function_call_arguments() {
    let root = parse("f(1, 2, 3)");
    let NodeKind::Function { name, children, .. } = &root.kind else {
        panic!("expected function");
    };
    assert_eq!(name, "f");
    let values: Vec<&str> = children
        .iter()
        .map(|c| match &c.kind {
            NodeKind::Number { value } => value.as_str(),
            other => panic!("expected number argument, got {other:?}"),
        })
        .collect();
    assert_eq!(values, ["1", "2", "3"]);
}

#[test]
fn implicit_multiplication_scenario() {
    let root = parse("2x + 3(x+1)");
    assert_eq!(node_to_string(&root), "((2 * x) + (3 * (x + 1)))");

    let NodeKind::Operator { op, children, .. } = &root.kind else {
        panic!("expected +");
    };
    assert_eq!(op, "+");
    let NodeKind::Operator {
        op: left_op,
        implicit,
        ..
    } = &children[0].kind
    else {
        panic!("expected *");
    };
    assert_eq!(left_op, "*");
    assert!(implicit);
}

#[test]
fn simple_arrow_function() {
    let root = parse("x -> x^2");
    let NodeKind::ArrowFunction {
        signature,
        children,
        ..
    } = &root.kind
    else {
        panic!("expected arrow function, got {root:?}");
    };
    assert_eq!(signature.vars.len(), 1);
    assert_eq!(signature.vars[0].name, "x");
    assert_eq!(signature.types.len(), 1);
    assert_eq!(signature.types[0].name, "real");
    assert!(signature.types[0].implicit);
    assert!(signature.return_type.is_none());
    assert!(matches!(
        &children[0].kind,
        NodeKind::Operator { op, .. } if op == "^"
    ));
}

#[test]
fn typed_arrow_function() {
    let root = parse("(x: real, y) -> x+y");
    let NodeKind::ArrowFunction { signature, .. } = &root.kind else {
        panic!("expected arrow function");
    };
    assert_eq!(signature.vars.len(), 2);
    assert_eq!(signature.types[0].name, "real");
    assert!(!signature.types[0].implicit);
    assert_eq!(signature.types[1].name, "real");
    assert!(signature.types[1].implicit);
}

#[test]
fn templated_variable_with_property_access() {
    let root = parse("pair::<complex, complex>.first");
    let NodeKind::Operator { op, children, .. } = &root.kind else {
        panic!("expected '.', got {root:?}");
    };
    assert_eq!(op, ".");
    assert!(matches!(
        &children[0].kind,
        NodeKind::Variable { name } if name == "pair::<complex, complex>"
    ));
    assert!(matches!(
        &children[1].kind,
        NodeKind::Str { contents, src: StrSource::PropertyAccess, .. } if contents == "first"
    ));
}

#[test]
fn spans_cover_subtrees() {
    let source = "2x + 3(x+1)";
    let root = parse(source);
    assert_eq!(root.span.as_range(), 0..source.len());
    let NodeKind::Operator { children, .. } = &root.kind else {
        panic!("expected +");
    };
    assert_eq!(children[0].span.as_range(), 0..2); // `2x`
    assert_eq!(children[1].span.as_range(), 5..11); // `3(x+1)`
}

#[test]
fn trailing_operator_errors() {
    assert!(parse_err("1 +").message().contains("Trailing operator '+'"));
    assert!(parse_err("x < y <").message().contains("Trailing operator '<'"));
}

#[test]
fn unbalanced_paren_error() {
    let error = parse_err("(");
    assert!(error.message().starts_with("Unbalanced"));
    assert_eq!(error.index(), 1);
}

#[test]
fn comma_in_empty_call_error() {
    let error = parse_err("f(,)");
    assert_eq!(error.message(), "Comma at start of parenthesized subexpression");
}

#[test]
fn error_reports_have_caret_lines() {
    let error = parse_err("2 + @");
    let lines: Vec<&str> = error.report().lines().collect();
    assert_eq!(lines[0], "Unrecognized token at line 1, index 4:");
    assert_eq!(lines[1], "2 + @");
    assert_eq!(lines[2], "    ^");
}

#[test]
fn deeply_nested_input_parses_without_overflow() {
    // 100k parenthesized negations; every pass and the drop must stay
    // iterative for this to terminate cleanly.
    let depth = 100_000;
    let mut source = String::with_capacity(depth * 3 + 1);
    for _ in 0..depth {
        source.push_str("(-");
    }
    source.push('x');
    for _ in 0..depth {
        source.push(')');
    }

    let root = parse_string(&source, &ParseOptions::default())
        .unwrap()
        .unwrap();
    assert!(matches!(&root.kind, NodeKind::Operator { op, .. } if op == "-"));
}

#[test]
fn depth_limit_rejects_deep_input() {
    let options = ParseOptions::default().with_max_expression_depth(Some(10));
    let source = format!("{}x{}", "(-".repeat(50), ")".repeat(50));
    let error = parse_string(&source, &options).unwrap_err();
    assert!(error.message().contains("deeper than 10 levels"));
}
