//! Error types for query parsing.
//!
//! Every failure mode is classified by [`ParseErrorKind`]; the surrounding
//! [`ParseError`] carries the offending query and byte position so errors
//! can be rendered with a caret pointing at the problem.

use std::{error::Error, fmt};

use thiserror::Error as ThisError;

/// The classified reason a parse failed.
///
/// All kinds are terminal for the current parse call; the parser never
/// continues scanning past the first violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ParseErrorKind {
    /// Input was empty, contained only separators, or produced a
    /// zero-length term or phrase.
    #[error("empty query")]
    EmptyQuery,

    /// A phrase delimiter has no matching closing delimiter.
    #[error("unpaired quotation mark")]
    UnpairedQuotation,

    /// A subquery bracket was opened but never closed, or closed without
    /// an open subquery.
    #[error("unpaired bracket")]
    UnpairedBracket,

    /// Two verb markers in a row, or a collapsed subquery whose verb
    /// contradicts its sole member's.
    #[error("unexpected verb sequence")]
    VerbSequence,

    /// A reserved character in a position its neighbours forbid.
    #[error("unexpected reserved character")]
    UnexpectedReservedRune,

    /// A string that names no known verb.
    #[error("unrecognized verb")]
    VerbUnrecognized,
}

/// A query parse error with position information.
///
/// Displays with the kind's message, the original query, and a caret
/// indicator when a byte position is known:
///
/// ```text
/// query syntax error: unpaired quotation mark
///   "unterminated
///   ^
/// hint: add a closing quote (") to complete the phrase
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    kind: ParseErrorKind,
    /// The original input.
    query: String,
    /// Byte position in the input where the error was detected, when the
    /// violation is attributable to a single character.
    position: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error for the given query.
    pub(crate) fn new(kind: ParseErrorKind, query: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            kind,
            query: query.into(),
            position,
        }
    }

    /// The classified failure.
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// The query that failed to parse.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Byte position of the offending character, if attributable.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns a suggestion for common mistakes.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind {
            ParseErrorKind::UnpairedQuotation => {
                Some("add a closing quote (\") to complete the phrase")
            }
            ParseErrorKind::UnpairedBracket => {
                Some("balance every [ with a matching ]")
            }
            ParseErrorKind::VerbSequence => {
                Some("apply a single +, -, or | directly to a word, phrase, or [subquery]")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query syntax error: {}", self.kind)?;

        if !self.query.is_empty() {
            write!(f, "\n  {}", self.query)?;
            if let Some(pos) = self.position {
                let clamped = pos.min(self.query.len());
                write!(f, "\n  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "\nhint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}
