// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Final sweep: group unwrapping, leftover-token detection, span
//! validation, and the optional depth limit.
//!
//! After the collapse passes, a group holding exactly one child is just
//! bracketing and is replaced by that child, the synthetic top-level group
//! and argument groups included. Whatever group then survives with
//! brackets is a user mistake: it either contains a comma outside a
//! function call or is empty. The comma diagnosis is preferred when both
//! would apply.
//!
//! The remaining checks are defensive: a transient token kind or an
//! out-of-bounds span anywhere in the finished tree is a parser bug and
//! is reported as an internal error rather than silently returned.

use crate::ast::{Node, NodeKind};
use crate::source_analysis::walk::{rewrite, visit, Order, WalkOptions};
use crate::source_analysis::{ParenKind, ParseError, ParseOptions, Token, TokenKind};

/// Steps K-N. Takes the original token list to phrase the empty-group
/// hint, and returns the final root.
pub(super) fn finalize(
    source: &str,
    tokens: &[Token],
    options: &ParseOptions,
    root: Node,
) -> Result<Node, ParseError> {
    let root = unwrap_groups(source, tokens, root)?;
    check_leftovers(source, &root)?;
    if let Some(max) = options.max_expression_depth {
        check_depth(source, &root, max)?;
    }
    Ok(root)
}

/// Step K: unwraps single-child groups and diagnoses the bracketed groups
/// that survive.
fn unwrap_groups(source: &str, tokens: &[Token], root: Node) -> Result<Node, ParseError> {
    rewrite(root, Order::Post, |mut node| {
        let span = node.span;
        let NodeKind::Group { paren, children } = &mut node.kind else {
            return Ok(node);
        };

        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return Ok(only);
            }
        }

        if matches!(paren, Some(ParenKind::Paren | ParenKind::Bracket)) {
            if children.iter().any(|c| matches!(c.kind, NodeKind::Comma)) {
                return Err(ParseError::spanned(
                    source,
                    span,
                    "Parenthesized subexpression containing a comma",
                )
                .with_note("commas only separate function arguments".to_string()));
            }
            if children.is_empty() {
                let mut error =
                    ParseError::spanned(source, span, "Empty parenthesized subexpression");
                if let Some(name) = called_variable_before(tokens, span.start()) {
                    error = error.with_suggestion(format!(
                        "If '{name}' is a function, remove the whitespace between '{name}' and '(' to call it"
                    ));
                }
                return Err(error);
            }
        }

        Ok(node)
    })
}

/// Looks for a variable directly before the opener at `opener_start`,
/// skipping the synthetic `*`; that shape suggests the user meant a
/// function call.
fn called_variable_before(tokens: &[Token], opener_start: u32) -> Option<ecow::EcoString> {
    let mut index = tokens.iter().position(|t| {
        t.span().start() == opener_start && matches!(t.kind(), TokenKind::Paren { .. })
    })?;
    while index > 0 {
        index -= 1;
        match tokens[index].kind() {
            TokenKind::Operator { implicit: true, .. } => {}
            TokenKind::Variable { name } => return Some(name.clone()),
            _ => return None,
        }
    }
    None
}

/// Steps L and M: no transient token kinds and no malformed spans may
/// survive to a finished tree.
fn check_leftovers(source: &str, root: &Node) -> Result<(), ParseError> {
    visit(root, &WalkOptions::default(), |node, _, _| {
        if node.is_token_kind() {
            return Err(ParseError::spanned(
                source,
                node.span,
                format!(
                    "Internal parser error: {} survived parsing",
                    node.description()
                ),
            ));
        }
        if matches!(node.kind, NodeKind::TypeAnnotation { .. }) {
            return Err(ParseError::spanned(
                source,
                node.span,
                "Type annotations are only allowed on arrow function parameters",
            ));
        }
        if node.span.start() > node.span.end() || node.span.end() as usize > source.len() {
            return Err(ParseError::new(
                source,
                node.span.start() as usize,
                "Internal parser error: node span escapes the source text",
            ));
        }
        Ok(())
    })
}

/// Step N: enforces the configured expression depth limit.
fn check_depth(source: &str, root: &Node, max: usize) -> Result<(), ParseError> {
    visit(root, &WalkOptions::default(), |node, _, depth| {
        if depth + 1 > max {
            return Err(ParseError::spanned(
                source,
                node.span,
                format!("Expression is nested deeper than {max} levels"),
            ));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse_string, ParseOptions};

    fn parse_err(source: &str) -> ParseError {
        parse_string(source, &ParseOptions::default()).unwrap_err()
    }

    #[test]
    fn single_child_groups_unwrap() {
        let root = parse_string("((x))", &ParseOptions::default())
            .unwrap()
            .unwrap();
        assert!(matches!(&root.kind, NodeKind::Variable { name } if name == "x"));
    }

    #[test]
    fn empty_parens_are_rejected() {
        let error = parse_err("()");
        assert_eq!(error.message(), "Empty parenthesized subexpression");
    }

    #[test]
    fn empty_parens_after_variable_hint_at_call() {
        let error = parse_err("sin ()");
        assert!(error
            .report()
            .contains("remove the whitespace between 'sin' and '('"));
    }

    #[test]
    fn comma_diagnosis_wins_over_empty() {
        let error = parse_err("(a, b)");
        assert_eq!(
            error.message(),
            "Parenthesized subexpression containing a comma"
        );
    }

    #[test]
    fn stray_type_annotation_is_rejected() {
        let error = parse_err("x: real");
        assert!(error
            .message()
            .contains("only allowed on arrow function parameters"));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let options = ParseOptions::default().with_max_expression_depth(Some(3));
        assert!(parse_string("1 + 2", &options).is_ok());
        let error = parse_string("((((1))))", &options);
        // Groups unwrap before the check, so nesting must be real.
        assert!(error.is_ok());
        let error = parse_string("1 + (2 * (3 - (4 / 5)))", &options).unwrap_err();
        assert!(error.message().contains("deeper than 3 levels"));
    }
}
