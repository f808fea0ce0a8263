//! Context-sensitive legality of reserved characters.
//!
//! The query grammar is not a simple regular language: whether a reserved
//! character is legal depends on what appears immediately before and
//! after it. `+word` is fine, `word+` is not; `][` is never legal while
//! `[[` always is. This module answers the local question "may this
//! classified occurrence appear here?" from the pairwise table below;
//! the parser remains responsible for global structure (bracket pairing,
//! phrase termination) and for the cells whose legality is genuinely
//! context-dependent, such as a phrase delimiter following another.

use crate::symbol::Role;

/// A classified neighbour of a reserved occurrence: either a real
/// character's role or the start/end-of-string boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// Start or end of the input.
    Bound,
    /// An in-bounds character with the given role.
    Char(Role),
}

impl Neighbor {
    /// Classifies an optional neighbouring character, mapping `None` to
    /// the string boundary.
    pub fn of(c: Option<char>) -> Self {
        match c {
            Some(c) => Self::Char(Role::classify(c)),
            None => Self::Bound,
        }
    }
}

/// Reports whether an occurrence of `curr` may legally follow `prev`.
///
/// The boundary sentinel doubles as both ends: `(Bound, curr)` asks
/// whether `curr` may open the input, `(prev, Bound)` whether `prev` may
/// close it.
pub fn pair_valid(prev: Neighbor, curr: Neighbor) -> bool {
    use Neighbor::{Bound, Char};
    use Role::{Plain, PhraseDelim, Separator, SubqueryEnd, SubqueryStart, VerbMarker};

    match (prev, curr) {
        // A dangling verb marker accepts only its object.
        (Char(VerbMarker), Char(PhraseDelim | SubqueryStart | Plain)) => true,
        (Char(VerbMarker), _) => false,
        // A quotation mark ends or begins a token; anything may follow.
        // Whether a delimiter pair is opening or closing is decided by
        // the parser's phrase scan, not here.
        (Char(PhraseDelim), _) => true,
        // An open subquery accepts everything except the end of input.
        (Char(SubqueryStart), Bound) => false,
        (Char(SubqueryStart), _) => true,
        // A closed subquery must be delimited before new content starts.
        (Char(SubqueryEnd), Char(SubqueryEnd | Separator) | Bound) => true,
        (Char(SubqueryEnd), _) => false,
        (Char(Separator), _) => true,
        // Words end at separators and closing brackets only; a quote,
        // bracket, or marker glued onto a word is malformed.
        (Char(Plain), Char(SubqueryEnd | Separator | Plain) | Bound) => true,
        (Char(Plain), _) => false,
        // Nothing closes at position zero, and empty input is not a pair.
        (Bound, Char(SubqueryEnd) | Bound) => false,
        (Bound, _) => true,
    }
}

/// Composed lookaround check for a single reserved occurrence: the
/// occurrence is legal when both the `(prev, curr)` and `(curr, next)`
/// pairs are legal.
///
/// A lone reserved character that is the entire input is legal only for
/// separators; a standalone space or comma is skipped while any other
/// solitary reserved character is malformed.
pub fn occurrence_valid(prev: Neighbor, curr: Role, next: Neighbor) -> bool {
    if prev == Neighbor::Bound && next == Neighbor::Bound {
        return curr == Role::Separator;
    }
    pair_valid(prev, Neighbor::Char(curr)) && pair_valid(Neighbor::Char(curr), next)
}
