// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Source analysis for Grapheme expressions: lexing, balancing, and tree
//! construction.
//!
//! Parsing is a fixed pipeline over a single mutable tree:
//!
//! 1. [`lex`] scans the text into [`Token`]s
//! 2. [`balance`] links bracket pairs and disambiguates vertical bars
//! 3. [`insert_implicit_multiplication`] makes value adjacency explicit
//! 4. the [`builder`](self) passes rewrite the token tree into the final
//!    [`Node`] tree
//!
//! The whole pipeline is pure and fail-fast: no globals, no recovery, the
//! first error aborts with a [`ParseError`]. All traversal is iterative,
//! so input-bounded but arbitrarily deep expressions cannot overflow the
//! call stack.
//!
//! # Example
//!
//! ```
//! use grapheme_core::ast::NodeKind;
//! use grapheme_core::source_analysis::{parse_string, ParseOptions};
//!
//! let root = parse_string("x^2", &ParseOptions::default()).unwrap().unwrap();
//! assert!(matches!(root.kind, NodeKind::Operator { .. }));
//! ```

mod balance;
mod builder;
mod error;
mod implicit;
mod lexer;
mod span;
mod token;
pub mod walk;

pub use balance::balance;
pub(crate) use balance::bracket_char;
pub use error::{format_error, ParseError};
pub use implicit::insert_implicit_multiplication;
pub use lexer::{
    is_variable_continue, is_variable_start, is_whitespace, lex, TEMPLATE_DEPTH_CAP,
};
pub use span::Span;
pub use token::{
    ParenKind, Quote, Token, TokenKind, POSTFIX_OPERATORS, PREFIX_OPERATORS,
};

use crate::ast::Node;

/// Configuration for a single parse.
///
/// ```
/// use grapheme_core::source_analysis::{parse_string, ParseOptions};
///
/// let options = ParseOptions::default().with_max_expression_depth(Some(4));
/// assert!(parse_string("1 + (2 - (3 * (4 / (5 - 6))))", &options).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Insert a synthetic `*` between adjacent value-like tokens.
    pub implicit_multiplication: bool,
    /// Maximum nesting depth of template specializations. Must be between
    /// 1 and [`TEMPLATE_DEPTH_CAP`].
    pub max_template_depth: usize,
    /// Maximum depth of the finished tree; `None` means unlimited.
    pub max_expression_depth: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            implicit_multiplication: true,
            max_template_depth: 16,
            max_expression_depth: None,
        }
    }
}

impl ParseOptions {
    /// Sets whether implicit multiplication is inserted.
    #[must_use]
    pub fn with_implicit_multiplication(mut self, on: bool) -> Self {
        self.implicit_multiplication = on;
        self
    }

    /// Sets the template nesting limit.
    #[must_use]
    pub fn with_max_template_depth(mut self, depth: usize) -> Self {
        self.max_template_depth = depth;
        self
    }

    /// Sets the expression depth limit.
    #[must_use]
    pub fn with_max_expression_depth(mut self, depth: Option<usize>) -> Self {
        self.max_expression_depth = depth;
        self
    }

    /// Rejects out-of-range option values.
    fn validate(&self, source: &str) -> Result<(), ParseError> {
        if self.max_template_depth == 0 || self.max_template_depth > TEMPLATE_DEPTH_CAP {
            return Err(ParseError::new(
                source,
                0,
                format!(
                    "Invalid option: max_template_depth must be between 1 and {TEMPLATE_DEPTH_CAP}"
                ),
            ));
        }
        if self.max_expression_depth == Some(0) {
            return Err(ParseError::new(
                source,
                0,
                "Invalid option: max_expression_depth must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A parsed expression paired with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The original input.
    pub source: String,
    /// The root of the tree, `None` for empty input.
    pub root: Option<Node>,
}

/// Runs the standalone tokenizer: scanner plus bracket balancer.
///
/// The returned tokens have definite bar directions and non-zero bracket
/// pair ids.
pub fn tokenize(source: &str, options: &ParseOptions) -> Result<Vec<Token>, ParseError> {
    options.validate(source)?;
    let mut tokens = lex(source, options.max_template_depth)?;
    balance(source, &mut tokens)?;
    Ok(tokens)
}

/// Parses `source` into its expression tree.
///
/// Returns `Ok(None)` for empty (or all-whitespace) input.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; see the crate docs for
/// the error taxonomy.
pub fn parse_string(source: &str, options: &ParseOptions) -> Result<Option<Node>, ParseError> {
    let mut tokens = tokenize(source, options)?;
    if options.implicit_multiplication {
        tokens = insert_implicit_multiplication(tokens);
    }
    builder::build_tree(source, &tokens, options)
}

/// Parses `source` and pairs the tree with the original text.
pub fn parse_expression(source: &str, options: &ParseOptions) -> Result<Expression, ParseError> {
    Ok(Expression {
        source: source.to_string(),
        root: parse_string(source, options)?,
    })
}
