// Copyright 2026 Grapheme Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parse errors and the source position service.
//!
//! Grapheme reports every failure as a [`ParseError`] carrying a rendered,
//! multi-line report: the message, the line and index of the offending
//! character, an excerpt of the containing line with a caret underneath,
//! and optional `Note:` / suggestion lines. Errors integrate with
//! [`miette`] so the CLI can render them with source highlighting.
//!
//! Long lines are windowed to [`EXCERPT_WIDTH`] characters around the
//! caret, with `...` marking the elided prefix/suffix.

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Span;

/// Maximum excerpt width before the error line is windowed around the caret.
const EXCERPT_WIDTH: usize = 75;

/// An error produced while parsing a Grapheme expression.
///
/// Parsing is fail-fast: the first error aborts the parse and is returned
/// to the caller. `Display` shows the full rendered report:
///
/// ```text
/// Unrecognized token at line 1, index 4:
/// 2 + @
///     ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{rendered}")]
pub struct ParseError {
    /// The short message, without location or excerpt.
    message: EcoString,
    /// The full report shown by `Display`.
    rendered: String,
    /// 1-based line containing the error.
    line: u32,
    /// Offset of the error within the source.
    index: usize,
    /// The (possibly windowed) line excerpt.
    excerpt: String,
    /// Caret line aligned under the excerpt.
    caret: String,
    /// Optional context referring to a related earlier token.
    note: Option<String>,
    /// Optional fix suggestion.
    #[help]
    suggestion: Option<String>,
    /// The span highlighted by miette-aware consumers.
    #[label("here")]
    span: Span,
}

impl ParseError {
    /// Creates an error pointing at `index` in `source`.
    ///
    /// An index equal to `source.len()` places the caret just past the end
    /// of input; this is used for "unclosed ..." errors. Larger indices are
    /// clamped.
    #[must_use]
    pub fn new(source: &str, index: usize, message: impl Into<EcoString>) -> Self {
        let index = clamp_to_char_boundary(source, index);
        let (line, excerpt, caret) = excerpt_at(source, index);
        let label_end = next_char_boundary(source, index);
        let mut error = Self {
            message: message.into(),
            rendered: String::new(),
            line,
            index,
            excerpt,
            caret,
            note: None,
            suggestion: None,
            span: Span::from(index..label_end),
        };
        error.rerender();
        error
    }

    /// Creates an error whose miette label covers `span`, with the caret at
    /// the span start.
    #[must_use]
    pub fn spanned(source: &str, span: Span, message: impl Into<EcoString>) -> Self {
        let mut error = Self::new(source, span.start() as usize, message);
        error.span = span;
        error
    }

    /// Attaches a `Note:` line referring to a related earlier token.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self.rerender();
        self
    }

    /// Attaches a fix suggestion, shown as the final report line.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self.rerender();
        self
    }

    /// Returns the short message without location or excerpt.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the full rendered report.
    #[must_use]
    pub fn report(&self) -> &str {
        &self.rendered
    }

    /// Returns the highlighted span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the 1-based line of the error.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns the offset of the error within the source.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    fn rerender(&mut self) {
        let mut out = format!(
            "{} at line {}, index {}:\n{}\n{}",
            self.message, self.line, self.index, self.excerpt, self.caret
        );
        if let Some(note) = &self.note {
            out.push_str("\nNote: ");
            out.push_str(note);
        }
        if let Some(suggestion) = &self.suggestion {
            out.push('\n');
            out.push_str(suggestion);
        }
        self.rendered = out;
    }
}

/// Renders an error report as a plain string without constructing a
/// [`ParseError`].
///
/// This is the formatting half of the position service; [`ParseError::new`]
/// is the error-constructing half.
#[must_use]
pub fn format_error(
    source: &str,
    index: usize,
    message: &str,
    suggestion: Option<&str>,
) -> String {
    let mut error = ParseError::new(source, index, message);
    if let Some(suggestion) = suggestion {
        error = error.with_suggestion(suggestion);
    }
    error.rendered
}

/// Clamps `index` into `[0, source.len()]` and onto a character boundary.
fn clamp_to_char_boundary(source: &str, index: usize) -> usize {
    let mut index = index.min(source.len());
    while index > 0 && !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Returns the end of the character starting at `index`, or `index` itself
/// at end of input.
fn next_char_boundary(source: &str, index: usize) -> usize {
    source[index..]
        .chars()
        .next()
        .map_or(index, |c| index + c.len_utf8())
}

/// Locates the line containing `index` and builds the excerpt and caret
/// lines, windowing long lines around the error column.
fn excerpt_at(source: &str, index: usize) -> (u32, String, String) {
    let line_start = source[..index].rfind('\n').map_or(0, |p| p + 1);
    let line_end = source[index..]
        .find('\n')
        .map_or(source.len(), |p| index + p);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "expressions over 4 billion lines are not supported"
    )]
    let line = source[..index].matches('\n').count() as u32 + 1;

    let line_text: Vec<char> = source[line_start..line_end].chars().collect();
    let column = source[line_start..index].chars().count();

    let (excerpt, caret_pad) = if line_text.len() > EXCERPT_WIDTH {
        let mut window_start = column.saturating_sub(EXCERPT_WIDTH / 2);
        let window_end = (window_start + EXCERPT_WIDTH).min(line_text.len());
        window_start = window_end.saturating_sub(EXCERPT_WIDTH);

        let mut excerpt = String::new();
        let mut pad = column - window_start;
        if window_start > 0 {
            excerpt.push_str("...");
            pad += 3;
        }
        excerpt.extend(&line_text[window_start..window_end]);
        if window_end < line_text.len() {
            excerpt.push_str("...");
        }
        (excerpt, pad)
    } else {
        (line_text.iter().collect(), column)
    };

    let mut caret = " ".repeat(caret_pad);
    caret.push('^');
    (line, excerpt, caret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_report_layout() {
        let error = ParseError::new("2 + @", 4, "Unrecognized token");
        assert_eq!(
            error.report(),
            "Unrecognized token at line 1, index 4:\n2 + @\n    ^"
        );
        assert_eq!(error.to_string(), error.report());
        assert_eq!(error.line(), 1);
        assert_eq!(error.index(), 4);
    }

    #[test]
    fn error_on_later_line() {
        let error = ParseError::new("a\nb\nc + @", 8, "Unrecognized token");
        assert_eq!(error.line(), 3);
        assert_eq!(
            error.report(),
            "Unrecognized token at line 3, index 8:\nc + @\n    ^"
        );
    }

    #[test]
    fn caret_past_end_of_input() {
        let error = ParseError::new("(x", 2, "Unclosed parenthesis");
        assert_eq!(
            error.report(),
            "Unclosed parenthesis at line 1, index 2:\n(x\n  ^"
        );
    }

    #[test]
    fn index_clamped_to_input() {
        let error = ParseError::new("ab", 99, "boom");
        assert_eq!(error.index(), 2);
    }

    #[test]
    fn note_and_suggestion_lines() {
        let error = ParseError::new("x + ", 4, "Trailing operator")
            .with_note("operator '+' at index 2")
            .with_suggestion("Remove the operator or give it a right operand");
        let report = error.report();
        assert!(report.ends_with(
            "Note: operator '+' at index 2\nRemove the operator or give it a right operand"
        ));
    }

    #[test]
    fn long_line_is_windowed() {
        let mut source = "x".repeat(200);
        source.push('@');
        let error = ParseError::new(&source, 200, "Unrecognized token");
        let mut lines = error.report().lines();
        lines.next();
        let excerpt = lines.next().unwrap();
        let caret = lines.next().unwrap();
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.len() <= EXCERPT_WIDTH + 6);
        assert_eq!(&excerpt[caret.len() - 1..caret.len()], "@");
    }

    #[test]
    fn windowed_prefix_and_suffix() {
        let source = format!("{}@{}", "a".repeat(100), "b".repeat(100));
        let error = ParseError::new(&source, 100, "bad");
        let excerpt = error.report().lines().nth(1).unwrap();
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.contains('@'));
    }

    #[test]
    fn format_error_matches_parse_error() {
        assert_eq!(
            format_error("1 ++", 3, "Unexpected operator", Some("Remove one '+'")),
            ParseError::new("1 ++", 3, "Unexpected operator")
                .with_suggestion("Remove one '+'")
                .report()
        );
    }
}
