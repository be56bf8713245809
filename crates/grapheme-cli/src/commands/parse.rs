// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! `grapheme parse` — parse one expression and print its tree.

use camino::Utf8Path;
use grapheme_core::prelude::*;
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::debug;

/// Parses an expression (from the argument or a file) and prints the
/// canonical rendering plus the full tree.
pub fn run(
    expression: Option<String>,
    file: Option<&Utf8Path>,
    options: &ParseOptions,
) -> Result<()> {
    let source = match (expression, file) {
        (Some(expression), None) => expression,
        (None, Some(path)) => std::fs::read_to_string(path)
            .into_diagnostic()
            .context(format!("could not read {path}"))?,
        _ => return Err(miette!("provide an expression or --file <path>")),
    };
    let source = source.trim_end_matches('\n').to_string();

    debug!(len = source.len(), "parsing expression");
    match parse_string(&source, options) {
        Ok(Some(root)) => {
            println!("{}", node_to_string(&root));
            println!("{root:#?}");
            Ok(())
        }
        Ok(None) => {
            println!("(empty input)");
            Ok(())
        }
        Err(error) => Err(miette::Report::new(error).with_source_code(source)),
    }
}
