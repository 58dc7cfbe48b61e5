//! Grammar
//!
//! Normalized text is tokenized with logos ([tokens]) and parsed from one of
//! three entry rules into an untyped [ParseNode] tree ([ir]). Two strategies
//! produce that tree:
//!
//!     - [declarative]: regex patterns over a token notation, tried first
//!     - [combinators]: a chumsky grammar with backtracking, used when the
//!       declarative stage fails or reports an ambiguity
//!
//! Both see the same token vector and build the same tree for any input they
//! both accept. [api] holds the driver tying them together.

pub mod api;
pub mod combinators;
pub mod declarative;
pub mod ir;
pub mod tokens;
pub mod vocabulary;

pub use api::{parse, parse_tokens, parse_with, Attempt, EntryRule, Parser, Strategy};
pub use ir::{ParseNode, Rule};
pub use tokens::{text_of, tokenize, Token, TokenSpan};
