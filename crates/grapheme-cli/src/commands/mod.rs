// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subcommand implementations.

pub mod parse;
pub mod repl;
pub mod tokens;
