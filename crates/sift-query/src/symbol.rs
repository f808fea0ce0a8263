//! Reserved-symbol classification.
//!
//! The characters ` `, `,`, `"`, `[`, `]`, `+`, `-`, and `|` are reserved
//! and carry context-dependent interpretations; every other character is
//! plain text. Classification drives both the parser's dispatch and the
//! adjacency validator.

/// The syntactic role of a single character in a raw query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Interchangeable element delimiters: space and comma.
    Separator,
    /// The double quotation mark opening or closing a phrase literal.
    PhraseDelim,
    /// `[`, opening a nested subquery.
    SubqueryStart,
    /// `]`, closing the innermost open subquery.
    SubqueryEnd,
    /// `+`, `-`, and the explicit should marker `|`.
    VerbMarker,
    /// Any non-reserved character.
    Plain,
}

impl Role {
    /// Classifies a single character.
    pub fn classify(c: char) -> Self {
        match c {
            ' ' | ',' => Self::Separator,
            '"' => Self::PhraseDelim,
            '[' => Self::SubqueryStart,
            ']' => Self::SubqueryEnd,
            '+' | '-' | '|' => Self::VerbMarker,
            _ => Self::Plain,
        }
    }

    /// Reports whether the character carries a reserved role.
    pub fn is_reserved(c: char) -> bool {
        !matches!(Self::classify(c), Self::Plain)
    }
}

/// Reports the first reserved character in `s` and its byte index.
pub fn next_reserved(s: &str) -> Option<(usize, char)> {
    s.char_indices().find(|&(_, c)| Role::is_reserved(c))
}
