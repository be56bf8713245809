// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! `grapheme repl` — an interactive parse loop.
//!
//! Reads one expression per line, prints the canonical rendering and the
//! tree, and shows parse errors inline. History persists under the
//! Grapheme dot-directory.

use std::fs;
use std::path::PathBuf;

use grapheme_core::prelude::*;
use miette::{IntoDiagnostic, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

/// Returns the Grapheme dot-directory, creating it if needed.
///
/// `GRAPHEME_DIR` overrides the default of `$HOME/.grapheme`.
fn grapheme_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("GRAPHEME_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".grapheme"),
            None => std::env::temp_dir().join("grapheme"),
        },
    };
    fs::create_dir_all(&dir).into_diagnostic()?;
    Ok(dir)
}

fn history_path() -> Result<PathBuf> {
    Ok(grapheme_dir()?.join("repl_history"))
}

/// Runs the interactive loop until EOF or interrupt.
pub fn run(options: &ParseOptions) -> Result<()> {
    let mut editor = DefaultEditor::new().into_diagnostic()?;
    let history = history_path()?;
    if editor.load_history(&history).is_err() {
        debug!("no REPL history yet");
    }

    println!("Grapheme expression parser. Ctrl-D to exit.");
    loop {
        match editor.readline("grapheme> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                show(line, options);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(miette::miette!("readline failed: {e}")),
        }
    }

    editor.save_history(&history).into_diagnostic()?;
    info!("REPL history saved");
    Ok(())
}

/// Parses one line and prints either the tree or the error report.
fn show(line: &str, options: &ParseOptions) {
    match parse_string(line, options) {
        Ok(Some(root)) => {
            println!("{}", node_to_string(&root));
            println!("{root:#?}");
        }
        Ok(None) => {}
        Err(error) => println!("{error}"),
    }
}
