// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Arrow-function collapse.
//!
//! Rewrites `params -> body` triples into [`NodeKind::ArrowFunction`]
//! nodes. Child lists are scanned right to left so `a -> b -> c`
//! associates as `a -> (b -> c)`.
//!
//! The parameter side must be a bare variable, a parenthesized list of
//! (optionally annotated) variables, or such a list annotated with a
//! return type. `v: t -> body` without parentheses is rejected: it reads
//! ambiguously and the annotation could just as well bind the body.

use std::mem;

use crate::ast::{ArrowSignature, Node, NodeKind, SignatureType, SignatureVar};
use crate::source_analysis::walk::{rewrite, Order};
use crate::source_analysis::ParseError;

/// Step J: collapses arrow tokens into arrow-function nodes, rightmost
/// first.
pub(super) fn collapse_arrow_functions(source: &str, root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Post, |mut node| {
        let Some(children) = node.children_mut() else {
            return Ok(node);
        };
        let mut i = children.len();
        while i > 0 {
            i -= 1;
            if !matches!(children[i].kind, NodeKind::Arrow) {
                continue;
            }
            let arrow_span = children[i].span;

            if i == 0 {
                return Err(ParseError::spanned(
                    source,
                    arrow_span,
                    "Arrow function has no parameter list",
                )
                .with_suggestion("Use '()' for a function taking no arguments"));
            }
            if i + 1 >= children.len() {
                return Err(ParseError::spanned(
                    source,
                    arrow_span,
                    "Arrow function has no body",
                ));
            }
            if !children[i + 1].is_valid_operand() {
                return Err(ParseError::spanned(
                    source,
                    children[i + 1].span,
                    format!(
                        "Arrow function body cannot start with {}",
                        children[i + 1].description()
                    ),
                )
                .with_note(format!("'->' at index {}", arrow_span.start())));
            }

            let body = children.remove(i + 1);
            children.remove(i); // the arrow
            let mut params = children.remove(i - 1);
            let signature = build_signature(source, &mut params, arrow_span.start())?;

            let span = params.span.merge(body.span);
            children.insert(
                i - 1,
                Node::new(
                    NodeKind::ArrowFunction {
                        signature,
                        children: vec![body],
                        arrow_index: arrow_span.start(),
                    },
                    span,
                ),
            );
            i -= 1;
        }
        Ok(node)
    })
}

/// Builds the signature from the node to the left of an arrow.
fn build_signature(
    source: &str,
    params: &mut Node,
    arrow_index: u32,
) -> Result<ArrowSignature, ParseError> {
    let params_span = params.span;
    match &mut params.kind {
        // `x -> ...`: one parameter of the assumed type.
        NodeKind::Variable { name } => Ok(ArrowSignature {
            vars: vec![SignatureVar {
                name: mem::take(name),
                span: params_span,
            }],
            types: vec![SignatureType::implicit_real(params_span)],
            return_type: None,
            span: params_span,
        }),

        // `(...) -> ...`: a parenthesized parameter list.
        NodeKind::Group { children, .. } => {
            signature_from_list(source, mem::take(children), params_span)
        }

        // `(...): t -> ...`: an annotated parameter list.
        NodeKind::TypeAnnotation { children } => {
            let mut children = mem::take(children);
            let Some(mut type_node) = children.pop() else {
                return Err(internal_signature_error(source, params_span));
            };
            let Some(mut annotated) = children.pop() else {
                return Err(internal_signature_error(source, params_span));
            };
            let NodeKind::TypeName { name } = &mut type_node.kind else {
                return Err(internal_signature_error(source, params_span));
            };
            let return_type = SignatureType {
                name: mem::take(name),
                span: type_node.span,
                implicit: false,
            };

            let NodeKind::Group { children: list, .. } = &mut annotated.kind else {
                return Err(ParseError::spanned(
                    source,
                    annotated.span,
                    "Arrow function with a return type needs a parenthesized parameter list",
                )
                .with_suggestion(
                    "Write '(x): real -> ...' instead of 'x: real -> ...'",
                ));
            };
            let mut signature = signature_from_list(source, mem::take(list), annotated.span)?;
            signature.return_type = Some(return_type);
            signature.span = params_span;
            Ok(signature)
        }

        _ => Err(ParseError::spanned(
            source,
            params_span,
            format!(
                "Arrow function parameters cannot be {}",
                params.description()
            ),
        )
        .with_note(format!("'->' at index {arrow_index}"))),
    }
}

/// Builds a signature from the children of a parenthesized parameter
/// list: variables and annotated variables separated by commas.
fn signature_from_list(
    source: &str,
    list: Vec<Node>,
    span: crate::source_analysis::Span,
) -> Result<ArrowSignature, ParseError> {
    let mut vars: Vec<SignatureVar> = Vec::new();
    let mut types: Vec<SignatureType> = Vec::new();

    for mut entry in list {
        let entry_span = entry.span;
        match &mut entry.kind {
            NodeKind::Comma => {}

            NodeKind::Variable { name } => {
                vars.push(SignatureVar {
                    name: mem::take(name),
                    span: entry_span,
                });
                types.push(SignatureType::implicit_real(entry_span));
            }

            NodeKind::TypeAnnotation { children } => {
                let mut children = mem::take(children);
                let Some(mut type_node) = children.pop() else {
                    return Err(internal_signature_error(source, entry_span));
                };
                let Some(mut var_node) = children.pop() else {
                    return Err(internal_signature_error(source, entry_span));
                };
                let NodeKind::TypeName { name: type_name } = &mut type_node.kind else {
                    return Err(internal_signature_error(source, entry_span));
                };
                let NodeKind::Variable { name } = &mut var_node.kind else {
                    return Err(ParseError::spanned(
                        source,
                        var_node.span,
                        format!(
                            "Arrow function parameter must be a variable, not {}",
                            var_node.description()
                        ),
                    ));
                };
                if name.contains("::") {
                    return Err(ParseError::spanned(
                        source,
                        var_node.span,
                        format!("Arrow function parameter '{name}' cannot be namespaced"),
                    ));
                }
                vars.push(SignatureVar {
                    name: mem::take(name),
                    span: var_node.span,
                });
                types.push(SignatureType {
                    name: mem::take(type_name),
                    span: type_node.span,
                    implicit: false,
                });
            }

            _ => {
                return Err(ParseError::spanned(
                    source,
                    entry_span,
                    format!(
                        "Invalid arrow function parameter: {}",
                        entry.description()
                    ),
                ));
            }
        }
    }

    Ok(ArrowSignature {
        vars,
        types,
        return_type: None,
        span,
    })
}

fn internal_signature_error(source: &str, span: crate::source_analysis::Span) -> ParseError {
    ParseError::spanned(
        source,
        span,
        "Internal parser error: malformed type annotation node",
    )
}
