// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Grapheme command-line interface.
//!
//! This is the main entry point for the `grapheme` command.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use grapheme_core::prelude::ParseOptions;
use miette::Result;

mod commands;

/// Grapheme: a parser for human-written mathematical expressions
#[derive(Debug, Parser)]
#[command(name = "grapheme")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Parser configuration shared by every subcommand.
#[derive(Debug, Args)]
struct ParserFlags {
    /// Do not insert `*` between adjacent values (`2x`, `3(x+1)`)
    #[arg(long)]
    no_implicit_multiplication: bool,

    /// Maximum nesting depth of template specializations
    #[arg(long, default_value_t = 16)]
    max_template_depth: usize,

    /// Maximum depth of the parsed tree (unlimited when omitted)
    #[arg(long)]
    max_expression_depth: Option<usize>,
}

impl ParserFlags {
    fn to_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_implicit_multiplication(!self.no_implicit_multiplication)
            .with_max_template_depth(self.max_template_depth)
            .with_max_expression_depth(self.max_expression_depth)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse an expression and print its tree
    Parse {
        /// The expression to parse
        expression: Option<String>,

        /// Read the expression from a file instead
        #[arg(long, conflicts_with = "expression")]
        file: Option<Utf8PathBuf>,

        #[command(flatten)]
        flags: ParserFlags,
    },

    /// Tokenize an expression and print the token list
    Tokens {
        /// The expression to tokenize
        expression: String,

        #[command(flatten)]
        flags: ParserFlags,
    },

    /// Start an interactive parse loop
    Repl {
        #[command(flatten)]
        flags: ParserFlags,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber only if RUST_LOG is explicitly set,
    // so normal output stays clean.
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    // Install miette's fancy error handler.
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse {
            expression,
            file,
            flags,
        } => commands::parse::run(expression, file.as_deref(), &flags.to_options()),
        Command::Tokens { expression, flags } => {
            commands::tokens::run(&expression, &flags.to_options())
        }
        Command::Repl { flags } => commands::repl::run(&flags.to_options()),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
