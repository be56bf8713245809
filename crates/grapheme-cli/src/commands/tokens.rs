// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! `grapheme tokens` — run the standalone tokenizer.

use grapheme_core::prelude::*;
use miette::Result;
use tracing::debug;

/// Tokenizes the expression and prints one token per line with its span.
pub fn run(source: &str, options: &ParseOptions) -> Result<()> {
    debug!(len = source.len(), "tokenizing expression");
    match tokenize(source, options) {
        Ok(tokens) => {
            for token in &tokens {
                let span = token.span();
                println!(
                    "{:>4}..{:<4} {:?}",
                    span.start(),
                    span.end(),
                    token.kind()
                );
            }
            Ok(())
        }
        Err(error) => Err(miette::Report::new(error).with_source_code(source.to_string())),
    }
}
