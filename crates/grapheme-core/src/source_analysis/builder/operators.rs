// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator collapse passes and chained comparisons.
//!
//! Operators are resolved by a fixed table of passes. Each pass sweeps
//! every child list in the tree, in its configured direction, collapsing
//! the operator tokens it owns into [`NodeKind::Operator`] nodes. Unary
//! `+`/`-` share the right-to-left pass with binary `^` so that `-x^y`
//! parses as `-(x^y)` and `2^3^4` associates right.
//!
//! Between the two phases, a child list holding two or more comparisons in
//! a row (`a < b < c`) is collapsed whole into a single `cchain` operator,
//! so chains never left-fold into `(a < b) < c`.

use std::mem;

use crate::ast::{Node, NodeKind, StrSource};
use crate::source_analysis::walk::{rewrite, Order};
use crate::source_analysis::{ParseError, Quote};

/// One operator pass: which operators it collapses and in which direction
/// it sweeps.
struct OperatorPass {
    unaries: &'static [&'static str],
    binaries: &'static [&'static str],
    postfixes: &'static [&'static str],
    rtl: bool,
}

/// Phase 1: everything that binds tighter than comparisons.
const PHASE_ONE: [OperatorPass; 5] = [
    OperatorPass {
        unaries: &[],
        binaries: &[],
        postfixes: &["!", "!!"],
        rtl: false,
    },
    OperatorPass {
        unaries: &["+", "-"],
        binaries: &["^"],
        postfixes: &[],
        rtl: true,
    },
    OperatorPass {
        unaries: &[],
        binaries: &["*", "/"],
        postfixes: &[],
        rtl: false,
    },
    OperatorPass {
        unaries: &[],
        binaries: &["+", "-"],
        postfixes: &[],
        rtl: false,
    },
    OperatorPass {
        unaries: &[],
        binaries: &["and", "or"],
        postfixes: &[],
        rtl: false,
    },
];

/// Phase 2: binary comparisons, after chains have been extracted.
const PHASE_TWO: [OperatorPass; 1] = [OperatorPass {
    unaries: &[],
    binaries: &COMPARISON_OPERATORS,
    postfixes: &[],
    rtl: false,
}];

/// The comparison operators that participate in `cchain`.
const COMPARISON_OPERATORS: [&str; 6] = ["==", "!=", "<", ">", "<=", ">="];

/// Step G: runs the phase-1 operator passes over the whole tree.
pub(super) fn apply_phase_one(source: &str, root: Node) -> Result<Node, ParseError> {
    apply_passes(source, root, &PHASE_ONE)
}

/// Step I: runs the phase-2 comparison pass over the whole tree.
pub(super) fn apply_phase_two(source: &str, root: Node) -> Result<Node, ParseError> {
    apply_passes(source, root, &PHASE_TWO)
}

fn apply_passes(source: &str, mut root: Node, passes: &[OperatorPass]) -> Result<Node, ParseError> {
    for pass in passes {
        root = rewrite(root, Order::Post, |mut node| {
            if let Some(children) = node.children_mut() {
                apply_pass_to_list(source, children, pass)?;
            }
            Ok(node)
        })?;
    }
    Ok(root)
}

/// Sweeps one child list for one pass, collapsing eligible operator
/// tokens in the pass direction.
fn apply_pass_to_list(
    source: &str,
    children: &mut Vec<Node>,
    pass: &OperatorPass,
) -> Result<(), ParseError> {
    if pass.rtl {
        let mut i = children.len();
        while i > 0 {
            i -= 1;
            if let Some(continue_at) = collapse_at(source, children, i, pass)? {
                i = continue_at + 1;
            }
        }
    } else {
        let mut i = 0;
        while i < children.len() {
            match collapse_at(source, children, i, pass)? {
                Some(continue_at) => i = continue_at,
                None => i += 1,
            }
        }
    }
    Ok(())
}

/// Tries to collapse the operator token at `i`. Returns the index of the
/// replacement node when a collapse happened, `None` otherwise.
fn collapse_at(
    source: &str,
    children: &mut Vec<Node>,
    i: usize,
    pass: &OperatorPass,
) -> Result<Option<usize>, ParseError> {
    let NodeKind::OperatorToken { op, .. } = &children[i].kind else {
        return Ok(None);
    };
    let op = op.as_str();
    let in_binaries = pass.binaries.contains(&op);
    let in_unaries = pass.unaries.contains(&op);
    let in_postfixes = pass.postfixes.contains(&op);
    if !in_binaries && !in_unaries && !in_postfixes {
        return Ok(None);
    }

    let left_valid = i > 0 && children[i - 1].is_valid_operand();
    let right_valid = i + 1 < children.len() && children[i + 1].is_valid_operand();
    let left_is_token = i > 0 && children[i - 1].is_operator_token();
    let right_is_token = i + 1 < children.len() && children[i + 1].is_operator_token();

    if in_binaries && left_valid && right_valid {
        let right = children.remove(i + 1);
        let operator = children.remove(i);
        let left = children.remove(i - 1);
        let span = left.span.merge(right.span);
        children.insert(i - 1, operator_node(operator, vec![left, right], span));
        return Ok(Some(i - 1));
    }

    // A unary prefix fires when nothing usable sits on its left: the list
    // start or another, not yet collapsed, operator token.
    if in_unaries && (i == 0 || left_is_token) {
        if right_valid {
            let right = children.remove(i + 1);
            let operator = children.remove(i);
            let span = operator.span.merge(right.span);
            children.insert(i, operator_node(operator, vec![right], span));
            return Ok(Some(i));
        }
        return Err(match children.get(i + 1) {
            Some(operand) => operand_error(source, &children[i], operand),
            None => missing_operand_error(source, &children[i]),
        });
    }

    // A postfix fires symmetrically: list end or an uncollapsed operator
    // token on the right.
    if in_postfixes && (i + 1 == children.len() || right_is_token) {
        if left_valid {
            let operator = children.remove(i);
            let left = children.remove(i - 1);
            let span = left.span.merge(operator.span);
            children.insert(i - 1, operator_node(operator, vec![left], span));
            return Ok(Some(i - 1));
        }
        return Err(match i.checked_sub(1).and_then(|p| children.get(p)) {
            Some(operand) => operand_error(source, &children[i], operand),
            None => missing_operand_error(source, &children[i]),
        });
    }

    if in_binaries && i > 0 && i + 1 < children.len() {
        // Both neighbors exist but at least one is unusable.
        let operand = if left_valid { &children[i + 1] } else { &children[i - 1] };
        return Err(operand_error(source, &children[i], operand));
    }

    Ok(None)
}

/// Rebuilds an operator token as an operator node over `operands`.
fn operator_node(mut token: Node, operands: Vec<Node>, span: crate::source_analysis::Span) -> Node {
    let NodeKind::OperatorToken { op, implicit } = &mut token.kind else {
        debug_assert!(false, "collapse_at only collapses operator tokens");
        return token;
    };
    Node::new(
        NodeKind::Operator {
            op: mem::take(op),
            implicit: *implicit,
            children: operands,
        },
        span,
    )
}

fn operand_error(source: &str, operator: &Node, operand: &Node) -> ParseError {
    let op = match &operator.kind {
        NodeKind::OperatorToken { op, .. } => op.as_str(),
        _ => "?",
    };
    ParseError::spanned(
        source,
        operand.span,
        format!("Operator '{op}' cannot be applied to {}", operand.description()),
    )
    .with_note(format!("operator '{op}' at index {}", operator.span.start()))
}

fn missing_operand_error(source: &str, operator: &Node) -> ParseError {
    let op = match &operator.kind {
        NodeKind::OperatorToken { op, .. } => op.as_str(),
        _ => "?",
    };
    ParseError::spanned(source, operator.span, format!("Operator '{op}' has no operand"))
}

/// Step H: collapses a whole child list of alternating operands and
/// comparison operators into a single `cchain` operator.
///
/// Requires an odd length of at least five (two or more comparisons); a
/// single comparison is left for the phase-2 binary pass.
pub(super) fn collapse_comparison_chains(root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Post, |mut node| {
        let span = node.span;
        let Some(children) = node.children_mut() else {
            return Ok(node);
        };
        if children.len() < 5 || children.len() % 2 == 0 {
            return Ok(node);
        }
        let alternates = children.iter().enumerate().all(|(idx, child)| {
            if idx % 2 == 0 {
                child.is_valid_operand()
            } else {
                matches!(
                    &child.kind,
                    NodeKind::OperatorToken { op, .. }
                        if COMPARISON_OPERATORS.contains(&op.as_str())
                )
            }
        });
        if !alternates {
            return Ok(node);
        }

        let old = mem::take(children);
        let chain: Vec<Node> = old
            .into_iter()
            .map(|mut child| {
                if let NodeKind::OperatorToken { op, .. } = &mut child.kind {
                    let op = mem::take(op);
                    Node::new(
                        NodeKind::Str {
                            contents: op,
                            src: StrSource::Operator,
                            quote: Quote::None,
                        },
                        child.span,
                    )
                } else {
                    child
                }
            })
            .collect();
        let chain_span = match (chain.first(), chain.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => span,
        };
        *children = vec![Node::new(
            NodeKind::Operator {
                op: "cchain".into(),
                implicit: false,
                children: chain,
            },
            chain_span,
        )];
        Ok(node)
    })
}
