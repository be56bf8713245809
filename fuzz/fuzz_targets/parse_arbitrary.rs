// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for parser crash safety.
//!
//! Feeds arbitrary byte sequences to the parser and asserts it never
//! panics: every input must produce either a tree or a `ParseError`.
//! Invalid UTF-8 is converted lossily (U+FFFD replacement) so unusual
//! character sequences still exercise the lexer.

#![no_main]

use grapheme_core::source_analysis::{parse_string, ParseOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    // Success = no panic. Errors are expected on most inputs.
    let _ = parse_string(&source, &ParseOptions::default());

    // The inserter and the depth limit take different code paths; run a
    // second configuration over the same input.
    let options = ParseOptions::default()
        .with_implicit_multiplication(false)
        .with_max_expression_depth(Some(64));
    let _ = parse_string(&source, &options);
});
