// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bracket balancing and vertical-bar disambiguation.
//!
//! A second linear pass over the token stream that links every opening
//! bracket to its closer through a shared pair id, rejects imbalance, and
//! decides which vertical bars open and which close.
//!
//! Bars are ambiguous: `|` opens after contexts that cannot end a value
//! (start of input, an operator, a comma, a colon, an arrow, or another
//! opener) and otherwise closes the innermost open bar as soon as one is
//! available. That rule reads `||x||` as two nested openers and still
//! closes the outer bar of `|3*|x||` in the right place.

use super::{ParenKind, ParseError, Token, TokenKind};

/// One open bracket awaiting its closer.
struct OpenBracket {
    pair_id: u32,
    kind: ParenKind,
    index: usize,
}

/// Assigns pair ids to every bracket token and resolves bar direction.
///
/// On success every `TokenKind::Paren` in `tokens` has a non-zero
/// `pair_id` and a definite `opening` flag.
pub fn balance(source: &str, tokens: &mut [Token]) -> Result<(), ParseError> {
    let mut stack: Vec<OpenBracket> = Vec::new();
    let mut counter: u32 = 0;

    for i in 0..tokens.len() {
        let TokenKind::Paren { kind, opening, .. } = *tokens[i].kind() else {
            continue;
        };
        let token_start = tokens[i].span().start() as usize;

        let opens = match kind {
            ParenKind::Paren | ParenKind::Bracket => opening,
            ParenKind::Bar => {
                bar_opens_after(i.checked_sub(1).map(|p| tokens[p].kind()))
                    || !matches!(stack.last(), Some(open) if open.kind == ParenKind::Bar)
            }
        };

        if opens {
            counter += 1;
            stack.push(OpenBracket {
                pair_id: counter,
                kind,
                index: token_start,
            });
            set_pair(&mut tokens[i], counter, true);
        } else {
            let Some(open) = stack.pop() else {
                return Err(ParseError::new(
                    source,
                    token_start,
                    format!(
                        "Unbalanced expression: '{}' does not close anything",
                        bracket_char(kind, false)
                    ),
                ));
            };
            if open.kind != kind {
                return Err(ParseError::new(
                    source,
                    token_start,
                    format!(
                        "Mismatched bracket: expected '{}' but found '{}'",
                        bracket_char(open.kind, false),
                        bracket_char(kind, false)
                    ),
                )
                .with_note(format!(
                    "'{}' opened at index {}",
                    bracket_char(open.kind, true),
                    open.index
                )));
            }
            set_pair(&mut tokens[i], open.pair_id, false);
        }
    }

    if let Some(outermost) = stack.first() {
        return Err(ParseError::new(
            source,
            source.len(),
            format!(
                "Unbalanced expression: '{}' was never closed",
                bracket_char(outermost.kind, true)
            ),
        )
        .with_note(format!("opened at index {}", outermost.index)));
    }

    Ok(())
}

/// Returns `true` when a bar after the given previous token must open.
fn bar_opens_after(prev: Option<&TokenKind>) -> bool {
    match prev {
        None => true,
        Some(kind) => {
            kind.is_operator()
                || kind.is_opening_paren()
                || matches!(kind, TokenKind::Comma | TokenKind::Colon | TokenKind::Arrow)
        }
    }
}

fn set_pair(token: &mut Token, id: u32, opens: bool) {
    if let TokenKind::Paren {
        pair_id, opening, ..
    } = token.kind_mut()
    {
        *pair_id = id;
        *opening = opens;
    }
}

/// Returns the display character for a bracket half.
pub(crate) const fn bracket_char(kind: ParenKind, opening: bool) -> char {
    match (kind, opening) {
        (ParenKind::Paren, true) => '(',
        (ParenKind::Paren, false) => ')',
        (ParenKind::Bracket, true) => '[',
        (ParenKind::Bracket, false) => ']',
        (ParenKind::Bar, _) => '|',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::lex;

    fn balanced(source: &str) -> Vec<Token> {
        let mut tokens = lex(source, 16).unwrap();
        balance(source, &mut tokens).unwrap();
        tokens
    }

    fn pairs(tokens: &[Token]) -> Vec<(u32, bool)> {
        tokens
            .iter()
            .filter_map(|t| match *t.kind() {
                TokenKind::Paren {
                    pair_id, opening, ..
                } => Some((pair_id, opening)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parens_and_brackets_pair_up() {
        let tokens = balanced("(a[b])");
        assert_eq!(
            pairs(&tokens),
            vec![(1, true), (2, true), (2, false), (1, false)]
        );
    }

    #[test]
    fn double_bars_open_twice() {
        let tokens = balanced("||x||");
        assert_eq!(
            pairs(&tokens),
            vec![(1, true), (2, true), (2, false), (1, false)]
        );
    }

    #[test]
    fn outer_bar_closes_normally() {
        let tokens = balanced("|3*|x||");
        assert_eq!(
            pairs(&tokens),
            vec![(1, true), (2, true), (2, false), (1, false)]
        );
    }

    #[test]
    fn bar_opens_after_comma_colon_arrow_and_openers() {
        balanced("f(a, |b|)");
        balanced("x -> |x|");
        balanced("(|x|)");
    }

    #[test]
    fn bar_after_value_multiplies() {
        // `x |y|` keeps the first bar as an opener for `|y|`; the implicit
        // multiplication pass makes the adjacency explicit later.
        let tokens = balanced("x|y|");
        assert_eq!(pairs(&tokens), vec![(1, true), (1, false)]);
    }

    #[test]
    fn unclosed_opener_reports_past_end() {
        let error = {
            let source = "(";
            let mut tokens = lex(source, 16).unwrap();
            balance(source, &mut tokens).unwrap_err()
        };
        assert!(error.message().starts_with("Unbalanced"));
        assert_eq!(error.index(), 1);
        assert!(error.report().contains("opened at index 0"));
    }

    #[test]
    fn unclosed_reports_outermost() {
        let source = "((x)";
        let mut tokens = lex(source, 16).unwrap();
        let error = balance(source, &mut tokens).unwrap_err();
        assert!(error.report().contains("opened at index 0"));
    }

    #[test]
    fn extra_closer_is_rejected() {
        let source = "x)";
        let mut tokens = lex(source, 16).unwrap();
        let error = balance(source, &mut tokens).unwrap_err();
        assert!(error.message().contains("does not close anything"));
        assert_eq!(error.index(), 1);
    }

    #[test]
    fn mismatched_closer_cites_both_sides() {
        let source = "(x]";
        let mut tokens = lex(source, 16).unwrap();
        let error = balance(source, &mut tokens).unwrap_err();
        assert!(error.message().contains("expected ')' but found ']'"));
        assert!(error.report().contains("'(' opened at index 0"));
    }

    #[test]
    fn bar_never_matches_paren() {
        let source = "(x|";
        let mut tokens = lex(source, 16).unwrap();
        // The bar closes nothing (top of stack is a paren), so it opens,
        // and the expression ends unbalanced.
        let error = balance(source, &mut tokens).unwrap_err();
        assert!(error.message().starts_with("Unbalanced"));
    }
}
