// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Grapheme expressions.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written: template specializations (`pair::<complex, complex>`)
//! are recognized recursively, several rules are context-sensitive (a name
//! after a colon is a type name, `and`/`or` are operators only before
//! whitespace), and the number automaton backtracks out of a half-eaten
//! exponent.
//!
//! Lexing is fail-fast: the first unrecognized character aborts with a
//! [`ParseError`]. Bracket pair ids are left unassigned here; the
//! [balancer](super::balance) fills them in.
//!
//! # Example
//!
//! ```
//! use grapheme_core::source_analysis::{lex, TokenKind};
//!
//! let tokens = lex("x + 1", 16).unwrap();
//! assert_eq!(tokens.len(), 3);
//! assert!(matches!(tokens[1].kind(), TokenKind::Operator { op, .. } if op == "+"));
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{ParenKind, ParseError, Quote, Span, Token, TokenKind};

/// Hard upper bound on the configurable template nesting depth.
pub const TEMPLATE_DEPTH_CAP: usize = 512;

/// Word operators that only match when followed by whitespace.
const WORD_OPERATORS: [&str; 2] = ["and", "or"];

/// Returns `true` for characters that may start a variable name.
#[must_use]
pub const fn is_variable_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns `true` for characters that may continue a variable name.
#[must_use]
pub const fn is_variable_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns `true` for characters the lexer skips between tokens.
///
/// Covers space, tab, line feed, form feed, carriage return, no-break
/// space, and the Unicode line/paragraph separators.
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\n' | '\u{000C}' | '\r' | '\u{00A0}' | '\u{2028}' | '\u{2029}'
    )
}

/// Lexes `source` into tokens.
///
/// `max_template_depth` bounds template-specialization nesting; it must
/// already be validated against [`TEMPLATE_DEPTH_CAP`].
pub fn lex(source: &str, max_template_depth: usize) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source, max_template_depth).lex_all()
}

/// A lexer over Grapheme source text.
struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    /// Maximum template-specialization nesting depth.
    max_template_depth: usize,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str, max_template_depth: usize) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            max_template_depth,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is the same as
    /// `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Creates a span from `start` to the current position.
    fn span_from(&self, start: usize) -> Span {
        Span::from(start..self.position)
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Lexes the whole input.
    fn lex_all(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            self.advance_while(is_whitespace);
            let start = self.position;
            let Some(c) = self.peek_char() else {
                break;
            };
            let after_colon = matches!(tokens.last().map(Token::kind), Some(TokenKind::Colon));
            let kind = self.lex_token_kind(c, start, after_colon)?;
            tokens.push(Token::new(kind, self.span_from(start)));
        }
        Ok(tokens)
    }

    /// Lexes one token starting with `c` at `start`.
    fn lex_token_kind(
        &mut self,
        c: char,
        start: usize,
        after_colon: bool,
    ) -> Result<TokenKind, ParseError> {
        match c {
            '(' | ')' | '[' | ']' | '|' => {
                self.advance();
                let (kind, opening) = match c {
                    '(' => (ParenKind::Paren, true),
                    ')' => (ParenKind::Paren, false),
                    '[' => (ParenKind::Bracket, true),
                    ']' => (ParenKind::Bracket, false),
                    // Bars are disambiguated by the balancer.
                    _ => (ParenKind::Bar, false),
                };
                Ok(TokenKind::Paren {
                    kind,
                    opening,
                    pair_id: 0,
                })
            }

            ',' => {
                self.advance();
                Ok(TokenKind::Comma)
            }

            '"' | '\'' => self.lex_string(c, start),

            '0'..='9' => Ok(self.lex_number(start)),

            '.' => {
                if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
                    Ok(self.lex_number(start))
                } else if self.peek_char_n(1).is_some_and(is_variable_start) {
                    Ok(self.lex_property_access())
                } else {
                    Err(ParseError::new(self.source, start, "Unrecognized token"))
                }
            }

            ':' => {
                if self.peek_char_n(1) == Some(':')
                    && self.peek_char_n(2).is_some_and(is_variable_start)
                {
                    // Absolute namespace: `::name`
                    self.lex_name(start, after_colon)
                } else {
                    self.advance();
                    Ok(TokenKind::Colon)
                }
            }

            '-' if self.peek_char_n(1) == Some('>') => {
                self.advance();
                self.advance();
                Ok(TokenKind::Arrow)
            }

            c if is_variable_start(c) => {
                if let Some(op) = self.try_word_operator() {
                    return Ok(op);
                }
                self.lex_name(start, after_colon)
            }

            '+' | '-' | '*' | '/' | '^' | '!' | '=' | '<' | '>' => Ok(self.lex_operator(c)),

            _ => Err(ParseError::new(self.source, start, "Unrecognized token")),
        }
    }

    /// Matches `and` / `or`, which only lex as operators when the character
    /// immediately after the word exists and is whitespace. `andy` is a
    /// variable; so is a trailing `and` at end of input.
    fn try_word_operator(&mut self) -> Option<TokenKind> {
        let rest = &self.source[self.position..];
        for op in WORD_OPERATORS {
            if rest.starts_with(op) && rest[op.len()..].chars().next().is_some_and(is_whitespace) {
                for _ in 0..op.len() {
                    self.advance();
                }
                return Some(TokenKind::Operator {
                    op: op.into(),
                    implicit: false,
                });
            }
        }
        None
    }

    /// Lexes a symbolic operator, longest match first. `=` canonicalizes
    /// to `==`.
    fn lex_operator(&mut self, c: char) -> TokenKind {
        self.advance();
        let op: EcoString = match (c, self.peek_char()) {
            ('!', Some('!')) => {
                self.advance();
                "!!".into()
            }
            ('!', Some('=')) => {
                self.advance();
                "!=".into()
            }
            ('=', Some('=')) => {
                self.advance();
                "==".into()
            }
            ('<', Some('=')) => {
                self.advance();
                "<=".into()
            }
            ('>', Some('=')) => {
                self.advance();
                ">=".into()
            }
            ('=', _) => "==".into(),
            ('+', _) => "+".into(),
            ('-', _) => "-".into(),
            ('*', _) => "*".into(),
            ('/', _) => "/".into(),
            ('^', _) => "^".into(),
            ('!', _) => "!".into(),
            ('<', _) => "<".into(),
            _ => ">".into(),
        };
        TokenKind::Operator {
            op,
            implicit: false,
        }
    }

    /// Lexes a string literal delimited by `quote_char`. A backslash
    /// escapes the next character (so `\"` does not terminate and `\\` is
    /// two escaped backslashes); contents are kept raw.
    fn lex_string(&mut self, quote_char: char, start: usize) -> Result<TokenKind, ParseError> {
        self.advance(); // opening quote
        let contents_start = self.position;
        let mut escaped = false;
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::new(
                        self.source,
                        start,
                        "Unterminated string literal",
                    ));
                }
                Some('\\') if !escaped => escaped = true,
                Some(c) if c == quote_char && !escaped => {
                    let contents = &self.source[contents_start..self.position - 1];
                    return Ok(TokenKind::Str {
                        contents: contents.into(),
                        quote: if quote_char == '"' {
                            Quote::Double
                        } else {
                            Quote::Single
                        },
                    });
                }
                Some(_) => escaped = false,
            }
        }
    }

    /// Lexes a number: `[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?`.
    ///
    /// A second `.` ends the token, and an exponent is rolled back when it
    /// has no digits or is followed by a decimal point, so `1e2.5` lexes as
    /// the number `1` with the rest left for later rules.
    fn lex_number(&mut self, start: usize) -> TokenKind {
        self.advance_while(|c| c.is_ascii_digit());

        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance(); // .
            self.advance_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let checkpoint = (self.chars.clone(), self.position);
            self.advance(); // e
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.advance();
            }
            let exponent_start = self.position;
            self.advance_while(|c| c.is_ascii_digit());
            if self.position == exponent_start || self.peek_char() == Some('.') {
                (self.chars, self.position) = checkpoint;
            }
        }

        TokenKind::Number {
            value: self.text_for(self.span_from(start)).into(),
        }
    }

    /// Lexes `.name` into a property access.
    fn lex_property_access(&mut self) -> TokenKind {
        self.advance(); // .
        let name_start = self.position;
        self.advance_while(is_variable_continue);
        TokenKind::PropertyAccess {
            prop: self.source[name_start..self.position].into(),
        }
    }

    /// Lexes a variable / function / type name: an optionally `::`-prefixed
    /// chain of simple names, followed by an optional template
    /// specialization. The token kind depends on context: a name after a
    /// colon is a [`TokenKind::TypeName`]; a name directly followed by `(`
    /// is a [`TokenKind::FunctionName`].
    fn lex_name(&mut self, start: usize, after_colon: bool) -> Result<TokenKind, ParseError> {
        self.lex_name_body();
        if self.at_template_start() {
            self.lex_template(start, 1)?;
        }

        if self.peek_char() == Some('<') {
            let name = self.text_for(self.span_from(start));
            return Err(ParseError::new(
                self.source,
                self.position,
                format!("Unexpected '<' immediately after '{name}'"),
            )
            .with_suggestion(format!(
                "Use '{name}::<...>' for a template specialization, or put whitespace before '<' for a comparison"
            )));
        }

        let name: EcoString = self.text_for(self.span_from(start)).into();
        if after_colon {
            Ok(TokenKind::TypeName { name })
        } else if self.peek_char() == Some('(') {
            Ok(TokenKind::FunctionName { name })
        } else {
            Ok(TokenKind::Variable { name })
        }
    }

    /// Consumes a name chain: `[::]name(::name)*`, stopping before a
    /// template `::<`.
    fn lex_name_body(&mut self) {
        if self.peek_char() == Some(':') {
            // Leading `::` (absolute namespace); the caller verified a name
            // start follows.
            self.advance();
            self.advance();
        }
        self.advance_while(is_variable_continue);
        while self.peek_char() == Some(':')
            && self.peek_char_n(1) == Some(':')
            && self.peek_char_n(2).is_some_and(is_variable_start)
        {
            self.advance();
            self.advance();
            self.advance_while(is_variable_continue);
        }
    }

    /// Returns `true` when the next characters are `::<`.
    fn at_template_start(&mut self) -> bool {
        self.peek_char() == Some(':')
            && self.peek_char_n(1) == Some(':')
            && self.peek_char_n(2) == Some('<')
    }

    /// Consumes a template specialization `::<arg, ...>`, where each
    /// argument is a name optionally carrying its own specialization.
    /// `depth` is the current nesting level, 1-based.
    fn lex_template(&mut self, name_start: usize, depth: usize) -> Result<(), ParseError> {
        if depth > self.max_template_depth {
            return Err(ParseError::new(
                self.source,
                self.position,
                format!(
                    "Template specialization nested deeper than {} levels",
                    self.max_template_depth
                ),
            )
            .with_note(format!("name began at index {name_start}")));
        }
        self.advance(); // :
        self.advance(); // :
        self.advance(); // <

        loop {
            self.advance_while(is_whitespace);
            let arg_start = self.position;
            let arg_ok = match self.peek_char() {
                Some(c) if is_variable_start(c) => true,
                Some(':') => {
                    self.peek_char_n(1) == Some(':')
                        && self.peek_char_n(2).is_some_and(is_variable_start)
                }
                _ => false,
            };
            if !arg_ok {
                return Err(self.template_argument_error(arg_start));
            }
            self.lex_name_body();
            if self.at_template_start() {
                self.lex_template(name_start, depth + 1)?;
            }

            self.advance_while(is_whitespace);
            match self.peek_char() {
                Some(',') => {
                    self.advance();
                }
                Some('>') => {
                    self.advance();
                    return Ok(());
                }
                _ => {
                    return Err(ParseError::new(
                        self.source,
                        self.position,
                        "Expected ',' or '>' in template specialization",
                    )
                    .with_note(format!("specialization began at index {name_start}")));
                }
            }
        }
    }

    fn template_argument_error(&self, at: usize) -> ParseError {
        ParseError::new(
            self.source,
            at,
            "Expected a type argument in template specialization",
        )
    }
}
