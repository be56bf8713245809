// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tree construction from a validated token stream.
//!
//! The builder is a pipeline of tree-rewriting passes over a single root
//! node, run in a fixed order:
//!
//! 1. pairwise token sanity scan (this module)
//! 2. parenthesization via bracket pair ids (this module)
//! 3. vertical bars to `abs` calls, function collapsing, property
//!    accesses, type annotations ([`collapse`])
//! 4. the operator passes and chained comparisons ([`operators`])
//! 5. arrow functions ([`arrows`])
//! 6. group unwrapping and the final validity sweep ([`finalize`])
//!
//! Each pass finishes completely before the next begins, and every pass
//! runs on the iterative walkers from [`walk`](super::walk), so deeply
//! nested expressions never exhaust the call stack. The pipeline is
//! fail-fast: the first error aborts the parse.

use std::collections::HashMap;

use crate::ast::{Node, NodeKind, StrSource};

use super::{ParseError, ParseOptions, Token, TokenKind};

mod arrows;
mod collapse;
mod finalize;
mod operators;

/// Builds the expression tree for a balanced token stream.
///
/// Returns `None` when the token list is empty.
pub(crate) fn build_tree(
    source: &str,
    tokens: &[Token],
    options: &ParseOptions,
) -> Result<Option<Node>, ParseError> {
    if tokens.is_empty() {
        return Ok(None);
    }

    check_token_pairs(source, tokens)?;
    let root = parenthesize(source, tokens)?;
    let root = collapse::bars_to_abs(root)?;
    let root = collapse::collapse_functions(source, root)?;
    let root = collapse::collapse_property_accesses(source, root)?;
    let root = collapse::collapse_type_annotations(source, root)?;
    let root = operators::apply_phase_one(source, root)?;
    let root = operators::collapse_comparison_chains(root)?;
    let root = operators::apply_phase_two(source, root)?;
    let root = arrows::collapse_arrow_functions(source, root)?;
    let root = finalize::finalize(source, tokens, options, root)?;
    Ok(Some(root))
}

/// Converts a scanner token into its tree representation.
fn token_to_node(token: &Token) -> Node {
    let kind = match token.kind() {
        TokenKind::Number { value } => NodeKind::Number {
            value: value.clone(),
        },
        TokenKind::Str { contents, quote } => NodeKind::Str {
            contents: contents.clone(),
            src: StrSource::Literal,
            quote: *quote,
        },
        TokenKind::Variable { name } => NodeKind::Variable { name: name.clone() },
        TokenKind::Comma => NodeKind::Comma,
        TokenKind::Paren {
            kind,
            opening,
            pair_id,
        } => NodeKind::Paren {
            kind: *kind,
            opening: *opening,
            pair_id: *pair_id,
        },
        TokenKind::FunctionName { name } => NodeKind::FunctionName { name: name.clone() },
        TokenKind::Operator { op, implicit } => NodeKind::OperatorToken {
            op: op.clone(),
            implicit: *implicit,
        },
        TokenKind::PropertyAccess { prop } => NodeKind::PropertyAccess { prop: prop.clone() },
        TokenKind::Colon => NodeKind::Colon,
        TokenKind::TypeName { name } => NodeKind::TypeName { name: name.clone() },
        TokenKind::Arrow => NodeKind::Arrow,
    };
    Node::new(kind, token.span())
}

/// Step A: rejects token adjacencies that can never be part of a valid
/// expression, so later passes can assume locally plausible input.
fn check_token_pairs(source: &str, tokens: &[Token]) -> Result<(), ParseError> {
    for i in 0..=tokens.len() {
        let prev = i.checked_sub(1).map(|p| &tokens[p]);
        let next = tokens.get(i);
        check_pair(source, prev, next)?;
    }
    Ok(())
}

/// Checks one adjacent token pair; either side may be the input boundary.
fn check_pair(
    source: &str,
    prev: Option<&Token>,
    next: Option<&Token>,
) -> Result<(), ParseError> {
    // Operator followed by operator, closer, or end of input.
    if let Some(t1) = prev {
        if let TokenKind::Operator { op, .. } = t1.kind() {
            match next {
                Some(t2) => match t2.kind() {
                    TokenKind::Operator { op: op2, .. } => {
                        if !t2.kind().is_prefix_operator() {
                            return Err(ParseError::spanned(
                                source,
                                t2.span(),
                                format!(
                                    "Unexpected operator '{op2}' immediately after operator '{op}'"
                                ),
                            )
                            .with_note(format!("operator '{op}' at index {}", t1.span().start())));
                        }
                    }
                    kind @ TokenKind::Paren { opening: false, .. } => {
                        if !t1.kind().is_postfix_operator() {
                            return Err(ParseError::spanned(
                                source,
                                t1.span(),
                                format!("Trailing operator '{op}'"),
                            )
                            .with_note(format!(
                                "subexpression closed by '{kind}' at index {}",
                                t2.span().start()
                            )));
                        }
                    }
                    _ => {}
                },
                None => {
                    if !t1.kind().is_postfix_operator() {
                        return Err(ParseError::spanned(
                            source,
                            t1.span(),
                            format!("Trailing operator '{op}'"),
                        ));
                    }
                }
            }
        }
    }

    let boundary_before = match prev.map(Token::kind) {
        None => true,
        Some(kind) => kind.is_opening_paren() || matches!(kind, TokenKind::Comma),
    };

    if let Some(t2) = next {
        match t2.kind() {
            // Non-prefix operator opening a (sub)expression.
            TokenKind::Operator { op, .. } => {
                if boundary_before && !t2.kind().is_prefix_operator() {
                    let place = if prev.is_some() {
                        "subexpression"
                    } else {
                        "expression"
                    };
                    return Err(ParseError::spanned(
                        source,
                        t2.span(),
                        format!("Unexpected operator '{op}' at the start of the {place}"),
                    ));
                }
            }

            TokenKind::Comma => match prev.map(Token::kind) {
                None => {
                    return Err(ParseError::spanned(
                        source,
                        t2.span(),
                        "Comma at start of expression",
                    ));
                }
                Some(TokenKind::Paren { opening: true, .. }) => {
                    return Err(ParseError::spanned(
                        source,
                        t2.span(),
                        "Comma at start of parenthesized subexpression",
                    ));
                }
                Some(TokenKind::Comma) => {
                    return Err(ParseError::spanned(source, t2.span(), "Consecutive commas"));
                }
                _ => {}
            },

            // Property access with nothing on its left.
            TokenKind::PropertyAccess { prop } => {
                let detached = match prev.map(Token::kind) {
                    None => true,
                    Some(kind) => {
                        kind.is_opening_paren()
                            || kind.is_operator()
                            || matches!(kind, TokenKind::Comma)
                    }
                };
                if detached {
                    return Err(ParseError::spanned(
                        source,
                        t2.span(),
                        format!("Property access '.{prop}' has nothing to access"),
                    ));
                }
            }

            _ => {}
        }
    } else if let Some(t1) = prev {
        // Comma at end of input.
        if matches!(t1.kind(), TokenKind::Comma) {
            return Err(ParseError::spanned(
                source,
                t1.span(),
                "Comma at end of expression",
            ));
        }
    }

    // Comma directly before a closer.
    if let (Some(t1), Some(t2)) = (prev, next) {
        if matches!(t1.kind(), TokenKind::Comma) && t2.kind().is_closing_paren() {
            return Err(ParseError::spanned(
                source,
                t1.span(),
                "Comma at end of parenthesized subexpression",
            ));
        }
    }

    Ok(())
}

/// Step B: folds bracket pairs into [`NodeKind::Group`] nodes in a single
/// left-to-right pass, producing the root group.
fn parenthesize(source: &str, tokens: &[Token]) -> Result<Node, ParseError> {
    let mut buffer: Vec<Node> = Vec::with_capacity(tokens.len());
    let mut openers: HashMap<u32, usize> = HashMap::new();

    for token in tokens {
        match token.kind() {
            TokenKind::Paren {
                opening: true,
                pair_id,
                ..
            } => {
                openers.insert(*pair_id, buffer.len());
                buffer.push(token_to_node(token));
            }
            TokenKind::Paren {
                opening: false,
                pair_id,
                kind,
            } => {
                let Some(open_at) = openers.remove(pair_id) else {
                    return Err(internal_error(source, token, "bracket pair id is unknown"));
                };
                let children: Vec<Node> = buffer.drain(open_at + 1..).collect();
                let opener_span = buffer[open_at].span;
                buffer[open_at] = Node::new(
                    NodeKind::Group {
                        paren: Some(*kind),
                        children,
                    },
                    opener_span.merge(token.span()),
                );
            }
            _ => buffer.push(token_to_node(token)),
        }
    }

    let span = tokens
        .first()
        .expect("build_tree rejects empty token lists")
        .span()
        .merge(tokens.last().expect("non-empty").span());
    Ok(Node::new(
        NodeKind::Group {
            paren: None,
            children: buffer,
        },
        span,
    ))
}

/// An error that indicates a bug in the parser rather than in the input.
fn internal_error(source: &str, token: &Token, what: &str) -> ParseError {
    ParseError::spanned(
        source,
        token.span(),
        format!("Internal parser error: {what}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{balance, lex};

    fn pair_check(source: &str) -> Result<(), ParseError> {
        let mut tokens = lex(source, 16).unwrap();
        balance(source, &mut tokens).unwrap();
        check_token_pairs(source, &tokens)
    }

    #[test]
    fn accepts_plausible_adjacencies() {
        for source in ["1 + 2", "-x", "(+x)", "f(a, -b)", "x!", "(x!)", "a.b"] {
            assert!(pair_check(source).is_ok(), "rejected {source:?}");
        }
    }

    #[test]
    fn rejects_consecutive_operators() {
        let error = pair_check("1 * / 2").unwrap_err();
        assert!(error.message().contains("'/' immediately after operator '*'"));
        // Prefix operators are allowed after another operator.
        assert!(pair_check("1 * -2").is_ok());
    }

    #[test]
    fn rejects_trailing_operators() {
        let error = pair_check("1 +").unwrap_err();
        assert!(error.message().contains("Trailing operator '+'"));
        let error = pair_check("(1 +)").unwrap_err();
        assert!(error.message().contains("Trailing operator '+'"));
        // Postfix operators may end a (sub)expression.
        assert!(pair_check("3!").is_ok());
        assert!(pair_check("(3!)").is_ok());
    }

    #[test]
    fn rejects_leading_non_prefix_operator() {
        let error = pair_check("* 2").unwrap_err();
        assert!(error.message().contains("start of the expression"));
        let error = pair_check("(* 2)").unwrap_err();
        assert!(error.message().contains("start of the subexpression"));
    }

    #[test]
    fn rejects_stray_commas() {
        assert!(pair_check(", a").unwrap_err().message().contains("start of expression"));
        assert!(pair_check("f(, a)")
            .unwrap_err()
            .message()
            .contains("start of parenthesized subexpression"));
        assert!(pair_check("a ,").unwrap_err().message().contains("end of expression"));
        assert!(pair_check("f(a ,)")
            .unwrap_err()
            .message()
            .contains("end of parenthesized subexpression"));
        assert!(pair_check("f(a ,, b)")
            .unwrap_err()
            .message()
            .contains("Consecutive commas"));
    }

    #[test]
    fn rejects_detached_property_access() {
        for source in [".x", "( .x)", "f(a, .x)", "1 + .x"] {
            let error = pair_check(source).unwrap_err();
            assert!(
                error.message().contains("nothing to access"),
                "wrong error for {source:?}: {}",
                error.message()
            );
        }
        assert!(pair_check("a.x").is_ok());
    }

    #[test]
    fn parenthesize_builds_groups() {
        let source = "(a(b))c";
        let mut tokens = lex(source, 16).unwrap();
        balance(source, &mut tokens).unwrap();
        let root = parenthesize(source, &tokens).unwrap();

        let NodeKind::Group { paren: None, children } = &root.kind else {
            panic!("expected root group");
        };
        assert_eq!(children.len(), 2);
        let NodeKind::Group {
            paren: Some(_),
            children: inner,
        } = &children[0].kind
        else {
            panic!("expected inner group");
        };
        // `a` and the nested `(b)` group
        assert_eq!(inner.len(), 2);
        assert_eq!(children[0].span.as_range(), 0..6);
    }
}
