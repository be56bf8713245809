// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Implicit multiplication insertion.
//!
//! Between two adjacent value-like tokens (`2x`, `3(x+1)`, `(a)(b)`,
//! `x|y|`), a synthetic `*` operator token is inserted so the operator
//! passes see an ordinary product. The synthetic token is flagged
//! `implicit: true` and sits on the byte just before its right neighbor.
//!
//! `[` is deliberately not a value-starting opener here: `arr[3]` stays
//! adjacent, reserving the bracket for subscript syntax rather than
//! reading it as `arr * [3]`.

use super::{ParenKind, Span, Token, TokenKind};

/// Returns `true` for tokens that can end a value.
fn ends_value(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number { .. }
            | TokenKind::Variable { .. }
            | TokenKind::Paren { opening: false, .. }
    )
}

/// Returns `true` for tokens that can start a value, square brackets
/// excluded.
fn starts_value(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Number { .. } | TokenKind::Variable { .. } | TokenKind::FunctionName { .. } => {
            true
        }
        TokenKind::Paren { kind, opening: true, .. } => *kind != ParenKind::Bracket,
        _ => false,
    }
}

/// Inserts synthetic `*` tokens between adjacent value-like tokens.
#[must_use]
pub fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = out.last() {
            if ends_value(prev.kind()) && starts_value(token.kind()) {
                let at = token.span().start().saturating_sub(1);
                out.push(Token::new(
                    TokenKind::Operator {
                        op: "*".into(),
                        implicit: true,
                    },
                    Span::new(at, at + 1),
                ));
            }
        }
        out.push(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{balance, lex};

    fn lexemes(source: &str) -> Vec<String> {
        let mut tokens = lex(source, 16).unwrap();
        balance(source, &mut tokens).unwrap();
        insert_implicit_multiplication(tokens)
            .iter()
            .map(|t| t.kind().to_string())
            .collect()
    }

    #[test]
    fn number_before_variable() {
        assert_eq!(lexemes("2x"), vec!["2", "*", "x"]);
    }

    #[test]
    fn number_before_paren_and_function() {
        assert_eq!(lexemes("3(x)"), vec!["3", "*", "(", "x", ")"]);
        assert_eq!(lexemes("2f(x)"), vec!["2", "*", "f", "(", "x", ")"]);
    }

    #[test]
    fn closing_paren_before_value() {
        assert_eq!(lexemes("(a)(b)"), vec!["(", "a", ")", "*", "(", "b", ")"]);
        assert_eq!(lexemes("(a)2"), vec!["(", "a", ")", "*", "2"]);
    }

    #[test]
    fn bars_participate() {
        assert_eq!(lexemes("x|y|"), vec!["x", "*", "|", "y", "|"]);
        assert_eq!(lexemes("|x||y|"), vec!["|", "x", "|", "*", "|", "y", "|"]);
    }

    #[test]
    fn brackets_are_not_value_starters() {
        // Subscript syntax: no `*` before `[`.
        assert_eq!(lexemes("arr[3]"), vec!["arr", "[", "3", "]"]);
        // But a closing bracket can end a value.
        assert_eq!(lexemes("arr[3]x"), vec!["arr", "[", "3", "]", "*", "x"]);
    }

    #[test]
    fn strings_do_not_multiply() {
        assert_eq!(lexemes("\"a\"x"), vec!["\"a\"", "x"]);
        assert_eq!(lexemes("x\"a\""), vec!["x", "\"a\""]);
    }

    #[test]
    fn operators_block_insertion() {
        assert_eq!(lexemes("2+x"), vec!["2", "+", "x"]);
    }

    #[test]
    fn synthetic_token_sits_before_neighbor() {
        let source = "2 x";
        let mut tokens = lex(source, 16).unwrap();
        balance(source, &mut tokens).unwrap();
        let tokens = insert_implicit_multiplication(tokens);
        assert!(matches!(
            tokens[1].kind(),
            TokenKind::Operator { op, implicit: true } if op == "*"
        ));
        assert_eq!(tokens[1].span().start(), tokens[2].span().start() - 1);
    }
}
