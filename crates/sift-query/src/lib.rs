//! Query parsing and tree model for sift search.
//!
//! This crate defines a compact free-text search syntax and converts raw
//! queries into structured trees, shaped for re-emission into the query
//! DSLs of full-text search engines:
//!
//! - **Words**: `golang` - a bare term
//! - **Phrases**: `"data science"` - adjacent words matched together;
//!   reserved symbols lose their meaning inside a phrase
//! - **Modal verbs**: `+math` must appear, `-hype` must not, unmarked
//!   terms are implicitly "should"
//! - **Subqueries**: `+[math data -hype]` - bracketed nesting, to any
//!   depth
//!
//! Separators (space, comma) delimit elements. A query such as
//! `"data science" +[math -hype]` should contain the phrase
//! "data science" and must satisfy the bracketed subquery.
//!
//! Parsing is a strict, single-pass scan: the first malformed character
//! aborts with a classified [`ParseError`], and a successful parse
//! returns an independently owned, immutable [`Tree`]. Semantically
//! redundant nesting is collapsed, so `[[golang]]` and `golang` produce
//! the identical tree.
//!
//! # Example
//!
//! ```
//! use sift_query::{Verb, parse};
//!
//! let tree = parse("\"data science\" +statistics -hype").unwrap();
//! let leaves = tree.leaves();
//! assert_eq!(leaves.len(), 3);
//! assert_eq!(leaves[0].phrase(), "data science");
//! assert_eq!(leaves[1].verb(), Verb::Must);
//! ```

#![warn(missing_docs)]

mod adjacency;
mod error;
mod parser;
mod symbol;
mod tree;
mod verb;

pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
pub use tree::{NodeId, NodeRef, Tree};
pub use verb::Verb;
