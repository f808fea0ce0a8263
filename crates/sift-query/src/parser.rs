//! Raw query text to tree conversion.
//!
//! A single left-to-right pass over the input. Each character is
//! dispatched on its reserved role, and every reserved occurrence must be
//! accepted by the adjacency validator before it takes effect; the first
//! violation aborts the parse with no backtracking and no partial tree.
//!
//! The tree grows through a mutable cursor: `[` appends a subquery node
//! and descends into it, `]` ascends to its parent. A subquery closing
//! over a single element is collapsed on the spot, and a root left with a
//! single element is promoted at the end, so `[[golang]]` and `golang`
//! parse to the identical tree.
//!
//! Phrase contents are opaque: no reserved character is interpreted
//! between a pair of quotation marks, and no backslash unescaping is
//! performed.

use tracing::{debug, trace};

use crate::{
    adjacency::{self, Neighbor},
    error::{ParseError, ParseErrorKind},
    symbol::{self, Role},
    tree::{NodeId, Tree},
    verb::Verb,
};

/// Single-pass parser state.
struct Parser<'a> {
    /// The raw query.
    input: &'a str,
    /// Byte position of the character being examined.
    pos: usize,
    /// The tree under construction.
    tree: Tree,
    /// The node currently accepting children.
    current: NodeId,
    /// A verb marker waiting for its object. Consuming it resets to the
    /// implicit should.
    pending: Option<Verb>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `input` with the cursor at a fresh root.
    fn new(input: &'a str) -> Self {
        let tree = Tree::new();
        let current = tree.root_id();
        Self {
            input,
            pos: 0,
            tree,
            current,
            pending: None,
        }
    }

    /// Runs the scan to completion.
    fn run(mut self) -> Result<Tree, ParseError> {
        if self.input.is_empty() {
            return Err(self.error_at(ParseErrorKind::EmptyQuery, None));
        }

        while let Some(c) = self.peek() {
            match Role::classify(c) {
                Role::Separator => self.on_separator(c)?,
                Role::VerbMarker => self.on_verb_marker(c)?,
                Role::PhraseDelim => self.on_phrase(c)?,
                Role::SubqueryStart => self.on_subquery_start(c)?,
                Role::SubqueryEnd => self.on_subquery_end(c)?,
                Role::Plain => self.on_word(),
            }
        }

        self.finish()
    }

    /// Separators delimit elements and otherwise carry no structure.
    fn on_separator(&mut self, c: char) -> Result<(), ParseError> {
        let (prev, next) = self.neighbors(c);
        if !adjacency::occurrence_valid(prev, Role::Separator, next) {
            return Err(self.error_here(ParseErrorKind::UnexpectedReservedRune));
        }
        self.advance(c);
        Ok(())
    }

    /// Records a verb for the next object.
    fn on_verb_marker(&mut self, c: char) -> Result<(), ParseError> {
        if self.pending.is_some() {
            return Err(self.error_here(ParseErrorKind::VerbSequence));
        }

        let (prev, next) = self.neighbors(c);
        if !adjacency::pair_valid(prev, Neighbor::Char(Role::VerbMarker)) {
            return Err(self.error_here(ParseErrorKind::UnexpectedReservedRune));
        }
        // A marker directly behind this one is reported by the next
        // iteration as a verb sequence, not as a placement error here.
        if next != Neighbor::Char(Role::VerbMarker)
            && !adjacency::pair_valid(Neighbor::Char(Role::VerbMarker), next)
        {
            return Err(self.error_here(ParseErrorKind::UnexpectedReservedRune));
        }

        self.pending = Verb::from_marker(c);
        self.advance(c);
        Ok(())
    }

    /// Scans a phrase literal and appends it as a leaf.
    ///
    /// The scan owns everything up to the matching delimiter; the
    /// adjacency table is only consulted for the opening position.
    fn on_phrase(&mut self, c: char) -> Result<(), ParseError> {
        let (prev, _) = self.neighbors(c);
        if !adjacency::pair_valid(prev, Neighbor::Char(Role::PhraseDelim)) {
            return Err(self.error_here(ParseErrorKind::UnexpectedReservedRune));
        }

        let open = self.pos;
        self.advance(c);
        let rest = &self.input[self.pos..];
        let Some(len) = rest.find('"') else {
            return Err(self.error_at(ParseErrorKind::UnpairedQuotation, Some(open)));
        };
        if len == 0 {
            return Err(self.error_at(ParseErrorKind::EmptyQuery, Some(open)));
        }

        let phrase = &rest[..len];
        let verb = self.take_pending();
        trace!(phrase, verb = %verb, "phrase leaf");
        self.tree.add_leaf(self.current, verb, phrase);
        self.pos += len + '"'.len_utf8();
        Ok(())
    }

    /// Opens a subquery and descends into it.
    ///
    /// An opening bracket at the end of input is deliberately not a
    /// placement error; the unclosed subquery is reported as an unpaired
    /// bracket when the scan runs out.
    fn on_subquery_start(&mut self, c: char) -> Result<(), ParseError> {
        let (prev, _) = self.neighbors(c);
        if !adjacency::pair_valid(prev, Neighbor::Char(Role::SubqueryStart)) {
            return Err(self.error_here(ParseErrorKind::UnexpectedReservedRune));
        }

        let verb = self.take_pending();
        trace!(verb = %verb, "descend into subquery");
        self.current = self.tree.add_child(self.current, verb);
        self.advance(c);
        Ok(())
    }

    /// Closes the innermost subquery and ascends.
    fn on_subquery_end(&mut self, c: char) -> Result<(), ParseError> {
        let closing = self.current;
        if closing == self.tree.root_id() {
            return Err(self.error_here(ParseErrorKind::UnpairedBracket));
        }

        let (prev, next) = self.neighbors(c);
        if !adjacency::pair_valid(prev, Neighbor::Char(Role::SubqueryEnd))
            || !adjacency::pair_valid(Neighbor::Char(Role::SubqueryEnd), next)
        {
            return Err(self.error_here(ParseErrorKind::UnexpectedReservedRune));
        }

        let Some(parent) = self.tree.parent_of(closing) else {
            return Err(self.error_here(ParseErrorKind::UnpairedBracket));
        };

        match self.tree.child_count(closing) {
            0 => return Err(self.error_here(ParseErrorKind::EmptyQuery)),
            1 => self.collapse_closed(closing)?,
            _ => {}
        }

        self.current = parent;
        self.advance(c);
        Ok(())
    }

    /// Hoists the sole element of a closing subquery into its place.
    ///
    /// The subquery's verb wins: `+[x]` is the same query as `+x`. An
    /// element carrying a different explicit verb has no coherent
    /// reading and is rejected.
    fn collapse_closed(&mut self, closing: NodeId) -> Result<(), ParseError> {
        let subquery_verb = self.tree.verb_of(closing);
        if let Some(child) = self.tree.only_child(closing) {
            let child_verb = self.tree.verb_of(child);
            if child_verb != Verb::Should && child_verb != subquery_verb {
                return Err(self.error_here(ParseErrorKind::VerbSequence));
            }
        }
        if let Some(hoisted) = self.tree.hoist_only_child(closing) {
            self.tree.set_verb(hoisted, subquery_verb);
            trace!("collapsed single-element subquery");
        }
        Ok(())
    }

    /// Scans a bare word up to the next reserved character.
    ///
    /// The terminating character is left in place and validates its own
    /// position on the next iteration.
    fn on_word(&mut self) {
        let rest = &self.input[self.pos..];
        let end = symbol::next_reserved(rest).map_or(rest.len(), |(i, _)| i);
        let word = &rest[..end];
        let verb = self.take_pending();
        trace!(word, verb = %verb, "word leaf");
        self.tree.add_leaf(self.current, verb, word);
        self.pos += end;
    }

    /// End-of-input bookkeeping: unclosed subqueries, root promotion,
    /// and the final recursive validity check.
    fn finish(mut self) -> Result<Tree, ParseError> {
        if self.current != self.tree.root_id() {
            return Err(self.error_at(ParseErrorKind::UnpairedBracket, None));
        }

        self.tree.promote_root();

        if !self.tree.is_valid() {
            return Err(self.error_at(ParseErrorKind::EmptyQuery, None));
        }

        Ok(self.tree)
    }

    /// The character at the scan position.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// The character immediately before the scan position.
    fn prev_char(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    /// The character immediately after the current character `c`.
    fn next_char(&self, c: char) -> Option<char> {
        self.input[self.pos + c.len_utf8()..].chars().next()
    }

    /// Classified neighbours of the current character `c`.
    fn neighbors(&self, c: char) -> (Neighbor, Neighbor) {
        (
            Neighbor::of(self.prev_char()),
            Neighbor::of(self.next_char(c)),
        )
    }

    /// Moves the scan position past `c`.
    fn advance(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    /// Consumes the pending verb, defaulting to the implicit should.
    fn take_pending(&mut self) -> Verb {
        self.pending.take().unwrap_or_default()
    }

    /// An error at the current scan position.
    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(kind, Some(self.pos))
    }

    /// An error at an explicit position (or none for whole-input faults).
    fn error_at(&self, kind: ParseErrorKind, position: Option<usize>) -> ParseError {
        ParseError::new(kind, self.input, position)
    }
}

/// Parses a raw text search query into a structured [`Tree`].
///
/// The produced tree is semantically isomorphic to the input but not
/// textually identical: separators are normalized away and non-branching
/// nesting is collapsed, so `[[golang]]` yields the same tree as
/// `golang`. Malformed input reports the first violation encountered as
/// a classified [`ParseError`].
pub fn parse(input: &str) -> Result<Tree, ParseError> {
    debug!(input, "parsing query");
    Parser::new(input).run()
}
