// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parser core for the Grapheme expression language.
//!
//! This crate turns human-written mathematical expressions into validated
//! abstract syntax trees:
//!
//! - Lexical analysis with template specializations, implicit
//!   multiplication, and word operators
//! - Vertical-bar absolute-value syntax and bracket balancing
//! - Multi-pass tree construction: precedence tiers, chained comparisons,
//!   property accesses, type annotations, arrow functions
//! - Human-readable error reports with line/column excerpts and carets
//!
//! Evaluation, type checking, and compilation of the resulting tree live
//! outside this crate; the parser is a pure function from text to tree.
//!
//! # Example
//!
//! ```
//! use grapheme_core::prelude::*;
//!
//! let root = parse_string("(x: real) -> |x| + 1", &ParseOptions::default())
//!     .unwrap()
//!     .unwrap();
//! assert!(matches!(root.kind, NodeKind::ArrowFunction { .. }));
//! assert_eq!(node_to_string(&root), "((x: real) -> (|x| + 1))");
//! ```

pub mod ast;
pub mod source_analysis;
pub mod unparse;

/// Re-export of the commonly used types.
pub mod prelude {
    pub use crate::ast::{ArrowSignature, Node, NodeKind, StrSource};
    pub use crate::source_analysis::{
        parse_expression, parse_string, tokenize, Expression, ParseError, ParseOptions, Span,
        Token, TokenKind,
    };
    pub use crate::unparse::node_to_string;
}
