// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Structural collapse passes: vertical bars, function calls, property
//! accesses, and type annotations.

use std::mem;

use crate::ast::{Node, NodeKind, ParenInfo, StrSource};
use crate::source_analysis::walk::{rewrite, Order};
use crate::source_analysis::{ParenKind, ParseError, Quote};

/// Step C: replaces every bar-delimited group with an `abs` call.
pub(super) fn bars_to_abs(root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Post, |mut node| {
        let span = node.span;
        if let NodeKind::Group {
            paren: Some(ParenKind::Bar),
            children,
        } = &mut node.kind
        {
            let children = mem::take(children);
            node.kind = NodeKind::Function {
                name: "abs".into(),
                paren_info: ParenInfo {
                    span,
                    vertical_bar: true,
                },
                children,
            };
        }
        Ok(node)
    })
}

/// Step D: collapses a function name followed by a group into a function
/// node whose children are the group's comma-separated argument segments.
///
/// Runs pre-order so the freshly attached argument subtrees are still
/// visited by this and later passes.
pub(super) fn collapse_functions(source: &str, root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Pre, |mut node| {
        let Some(children) = node.children_mut() else {
            return Ok(node);
        };
        if !children
            .iter()
            .any(|c| matches!(c.kind, NodeKind::FunctionName { .. }))
        {
            return Ok(node);
        }

        let old = mem::take(children);
        let mut out: Vec<Node> = Vec::with_capacity(old.len());
        let mut iter = old.into_iter();
        while let Some(mut child) = iter.next() {
            let NodeKind::FunctionName { name } = &mut child.kind else {
                out.push(child);
                continue;
            };
            let name = mem::take(name);

            // The scanner only emits a function name directly before `(`,
            // and balancing turned that bracket into a group.
            let Some(mut arguments) = iter.next() else {
                return Err(ParseError::spanned(
                    source,
                    child.span,
                    format!("Internal parser error: function '{name}' has no argument list"),
                ));
            };
            if !matches!(arguments.kind, NodeKind::Group { .. }) {
                return Err(ParseError::spanned(
                    source,
                    arguments.span,
                    format!("Internal parser error: function '{name}' is not followed by a group"),
                ));
            }

            let args = split_arguments(arguments.take_children());
            out.push(Node::new(
                NodeKind::Function {
                    name,
                    paren_info: ParenInfo {
                        span: arguments.span,
                        vertical_bar: false,
                    },
                    children: args,
                },
                child.span.merge(arguments.span),
            ));
        }
        *children = out;
        Ok(node)
    })
}

/// Splits a group's children on commas; each segment becomes either its
/// single node or a synthetic group.
fn split_arguments(children: Vec<Node>) -> Vec<Node> {
    let mut args: Vec<Node> = Vec::new();
    let mut segment: Vec<Node> = Vec::new();
    let had_children = !children.is_empty();
    for child in children {
        if matches!(child.kind, NodeKind::Comma) {
            args.push(segment_node(mem::take(&mut segment)));
        } else {
            segment.push(child);
        }
    }
    if had_children {
        args.push(segment_node(segment));
    }
    args
}

fn segment_node(mut segment: Vec<Node>) -> Node {
    debug_assert!(
        !segment.is_empty(),
        "the pairwise token scan rejects empty argument segments"
    );
    if segment.len() == 1 {
        if let Some(only) = segment.pop() {
            return only;
        }
    }
    let span = match (segment.first(), segment.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => crate::source_analysis::Span::default(),
    };
    Node::new(
        NodeKind::Group {
            paren: None,
            children: segment,
        },
        span,
    )
}

/// Step E: folds `expr .prop` into a `.` operator whose right child is a
/// synthetic string carrying the property name.
pub(super) fn collapse_property_accesses(source: &str, root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Post, |mut node| {
        let Some(children) = node.children_mut() else {
            return Ok(node);
        };
        if !children
            .iter()
            .any(|c| matches!(c.kind, NodeKind::PropertyAccess { .. }))
        {
            return Ok(node);
        }

        let old = mem::take(children);
        let mut out: Vec<Node> = Vec::with_capacity(old.len());
        for mut child in old {
            let NodeKind::PropertyAccess { prop } = &mut child.kind else {
                out.push(child);
                continue;
            };
            let prop = mem::take(prop);
            let Some(object) = out.pop() else {
                return Err(ParseError::spanned(
                    source,
                    child.span,
                    format!("Property access '.{prop}' has nothing to access"),
                ));
            };
            let span = object.span.merge(child.span);
            let property = Node::new(
                NodeKind::Str {
                    contents: prop,
                    src: StrSource::PropertyAccess,
                    quote: Quote::None,
                },
                child.span,
            );
            out.push(Node::new(
                NodeKind::Operator {
                    op: ".".into(),
                    implicit: false,
                    children: vec![object, property],
                },
                span,
            ));
        }
        *children = out;
        Ok(node)
    })
}

/// Step F: folds `expr : typename` triples into type-annotation nodes.
///
/// Only a variable or a parenthesized group may be annotated, and the
/// right-hand side must be a type name.
pub(super) fn collapse_type_annotations(source: &str, root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Post, |mut node| {
        let Some(children) = node.children_mut() else {
            return Ok(node);
        };
        let mut i = 0;
        while i < children.len() {
            if !matches!(children[i].kind, NodeKind::Colon) {
                i += 1;
                continue;
            }
            let colon_span = children[i].span;

            if i == 0 {
                return Err(ParseError::spanned(
                    source,
                    colon_span,
                    "Type annotation ':' at the start of a subexpression",
                ));
            }
            if i + 1 >= children.len() {
                return Err(ParseError::spanned(
                    source,
                    colon_span,
                    "Missing type after ':'",
                ));
            }
            if !matches!(
                children[i - 1].kind,
                NodeKind::Variable { .. } | NodeKind::Group { .. }
            ) {
                return Err(ParseError::spanned(
                    source,
                    colon_span,
                    format!(
                        "Type annotation ':' cannot follow {}",
                        children[i - 1].description()
                    ),
                )
                .with_suggestion(
                    "Only a variable or a parenthesized expression can be annotated",
                ));
            }
            if !matches!(children[i + 1].kind, NodeKind::TypeName { .. }) {
                return Err(ParseError::spanned(
                    source,
                    children[i + 1].span,
                    format!(
                        "Expected a type name after ':', found {}",
                        children[i + 1].description()
                    ),
                )
                .with_note(format!("':' at index {}", colon_span.start())));
            }

            let type_name = children.remove(i + 1);
            children.remove(i); // the colon
            let annotated = children.remove(i - 1);
            let span = annotated.span.merge(type_name.span);
            children.insert(
                i - 1,
                Node::new(
                    NodeKind::TypeAnnotation {
                        children: vec![annotated, type_name],
                    },
                    span,
                ),
            );
            // Continue scanning after the new annotation node.
        }
        Ok(node)
    })
}
