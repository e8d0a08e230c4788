//! Error types shared by the parser combinators and the public entry points.

use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use thiserror::Error;

/// Errors that can occur while parsing an S-expression.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SexprParseError {
    /// The input does not match the grammar.
    #[error("syntax error at {line}:{column}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },
    /// A length-prefixed literal disagrees with its actual content. This
    /// signals corrupted data rather than a grammar mismatch.
    #[error("invalid data of length {found}, expected {declared} (at {line}:{column})")]
    LengthMismatch {
        declared: usize,
        found: usize,
        line: usize,
        column: usize,
    },
}

impl SexprParseError {
    /// Returns true for errors caused by inconsistent data in the input.
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self, Self::LengthMismatch { .. })
    }

    pub(crate) fn from_failure(source: &str, failure: Failure<'_>) -> Self {
        let (line, column) = line_and_column(source, failure.input);

        match failure.cause {
            Cause::LengthMismatch { declared, found } => Self::LengthMismatch {
                declared,
                found,
                line,
                column,
            },
            Cause::Expected(expected) => Self::Syntax {
                line,
                column,
                expected: expected.to_string(),
                found: excerpt(failure.input),
            },
            Cause::Nom(kind) => Self::Syntax {
                line,
                column,
                expected: match kind {
                    ErrorKind::Eof => "end of input".to_string(),
                    _ => "s-expression".to_string(),
                },
                found: excerpt(failure.input),
            },
        }
    }
}

/// Why a combinator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cause {
    Nom(ErrorKind),
    Expected(&'static str),
    LengthMismatch { declared: usize, found: usize },
}

/// The error type threaded through every combinator in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Failure<'a> {
    pub input: &'a str,
    pub cause: Cause,
}

impl<'a> Failure<'a> {
    pub fn expected(input: &'a str, expected: &'static str) -> Self {
        Self {
            input,
            cause: Cause::Expected(expected),
        }
    }

    pub fn length_mismatch(input: &'a str, declared: usize, found: usize) -> Self {
        Self {
            input,
            cause: Cause::LengthMismatch { declared, found },
        }
    }
}

impl<'a> ParseError<&'a str> for Failure<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self {
            input,
            cause: Cause::Nom(kind),
        }
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }

    // Keep whichever branch got furthest into the input, it usually carries
    // the most useful expectation.
    fn or(self, other: Self) -> Self {
        if other.input.len() <= self.input.len() {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for Failure<'a> {
    fn add_context(_input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        if let Cause::Nom(_) = other.cause {
            other.cause = Cause::Expected(ctx);
        }

        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for Failure<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _: E) -> Self {
        Self::from_error_kind(input, kind)
    }
}

pub(crate) type PResult<'a, T> = nom::IResult<&'a str, T, Failure<'a>>;

/// 1-based line and column of `rest` within `source`.
fn line_and_column(source: &str, rest: &str) -> (usize, usize) {
    let offset = source.len().saturating_sub(rest.len());
    let consumed = &source[..offset];

    let line = consumed.matches('\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(newline) => consumed[newline + 1..].chars().count() + 1,
        None => consumed.chars().count() + 1,
    };

    (line, column)
}

fn excerpt(rest: &str) -> String {
    if rest.is_empty() {
        return "end of input".to_string();
    }

    let snippet: String = rest.chars().take(16).collect();
    let snippet = snippet.lines().next().unwrap_or_default();

    format!("{snippet:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let source = "(a\n  (b c)\n  d)";

        assert_eq!(line_and_column(source, source), (1, 1));
        assert_eq!(line_and_column(source, &source[3..]), (2, 1));
        assert_eq!(line_and_column(source, &source[6..]), (2, 4));
        assert_eq!(line_and_column(source, ""), (3, 5));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt(""), "end of input");
        assert_eq!(excerpt("abc\ndef"), "\"abc\"");
    }
}
