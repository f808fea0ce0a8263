//! Modal verbs applied to query terms, phrases, and subqueries.

use std::{fmt, str::FromStr};

use crate::error::{ParseError, ParseErrorKind};

/// The modal verb qualifying a node relative to its parent.
///
/// Terms are implicitly modified by [`Verb::Should`]; `+` and `-` mark a
/// term as required or forbidden. The explicit should marker `|` is
/// accepted on input but never rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Verb {
    /// The term may match but need not (the unmarked default).
    #[default]
    Should,
    /// The term must match.
    Must,
    /// The term must not match.
    MustNot,
    /// Sentinel for strings that name no known verb. Never present in a
    /// validated tree.
    Unrecognized,
}

impl Verb {
    /// Canonical marker symbol used when rendering trees.
    ///
    /// Should is the implicit, unmarked default and renders as the empty
    /// string.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Should => "",
            Self::Must => "+",
            Self::MustNot => "-",
            Self::Unrecognized => "_error_",
        }
    }

    /// Human readable name.
    pub fn human(self) -> &'static str {
        match self {
            Self::Should => "should",
            Self::Must => "must",
            Self::MustNot => "must not",
            Self::Unrecognized => "_error_",
        }
    }

    /// Maps a verb marker character to its verb.
    ///
    /// Returns `None` for characters that are not verb markers.
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Must),
            '-' => Some(Self::MustNot),
            '|' => Some(Self::Should),
            _ => None,
        }
    }

    /// Reports whether the verb may appear in a validated tree.
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.human())
    }
}

impl FromStr for Verb {
    type Err = ParseError;

    /// Parses a verb from either its canonical symbol or its human
    /// readable name. Unknown strings report [`ParseErrorKind::VerbUnrecognized`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "|" | "should" => Ok(Self::Should),
            "+" | "must" => Ok(Self::Must),
            "-" | "must not" => Ok(Self::MustNot),
            _ => Err(ParseError::new(
                ParseErrorKind::VerbUnrecognized,
                s,
                None,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_should() {
        assert_eq!(Verb::default(), Verb::Should);
    }

    #[test]
    fn symbols() {
        assert_eq!(Verb::Should.symbol(), "");
        assert_eq!(Verb::Must.symbol(), "+");
        assert_eq!(Verb::MustNot.symbol(), "-");
    }

    #[test]
    fn human_strings() {
        assert_eq!(Verb::Should.human(), "should");
        assert_eq!(Verb::Must.human(), "must");
        assert_eq!(Verb::MustNot.human(), "must not");
    }

    #[test]
    fn from_marker() {
        assert_eq!(Verb::from_marker('+'), Some(Verb::Must));
        assert_eq!(Verb::from_marker('-'), Some(Verb::MustNot));
        assert_eq!(Verb::from_marker('|'), Some(Verb::Should));
        assert_eq!(Verb::from_marker('x'), None);
        assert_eq!(Verb::from_marker('"'), None);
    }

    #[test]
    fn parse_from_symbol() {
        assert_eq!("".parse::<Verb>().unwrap(), Verb::Should);
        assert_eq!("|".parse::<Verb>().unwrap(), Verb::Should);
        assert_eq!("+".parse::<Verb>().unwrap(), Verb::Must);
        assert_eq!("-".parse::<Verb>().unwrap(), Verb::MustNot);
    }

    #[test]
    fn parse_from_human() {
        assert_eq!("should".parse::<Verb>().unwrap(), Verb::Should);
        assert_eq!("must".parse::<Verb>().unwrap(), Verb::Must);
        assert_eq!("must not".parse::<Verb>().unwrap(), Verb::MustNot);
    }

    #[test]
    fn parse_unrecognized() {
        for bad in ["mustn't", "MUST", "shall", "++", "_error_"] {
            let err = bad.parse::<Verb>().unwrap_err();
            assert_eq!(err.kind(), crate::ParseErrorKind::VerbUnrecognized, "{bad}");
        }
    }

    #[test]
    fn round_trip_through_strings() {
        for verb in [Verb::Should, Verb::Must, Verb::MustNot] {
            assert_eq!(verb.symbol().parse::<Verb>().unwrap(), verb);
            assert_eq!(verb.human().parse::<Verb>().unwrap(), verb);
        }
    }

    #[test]
    fn sentinel_is_invalid() {
        assert!(Verb::Should.is_valid());
        assert!(Verb::Must.is_valid());
        assert!(Verb::MustNot.is_valid());
        assert!(!Verb::Unrecognized.is_valid());
    }
}
