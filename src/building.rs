//! Model building
//!
//!     The last stage of parsing: the untyped [ParseNode](crate::grammar::ParseNode)
//!     tree is walked by [ModelBuilder] into the typed [model](crate::model).
//!     Single-word type and keyword identifiers go through [singular] first,
//!     since the vocabularies are singular and card text is not.

pub mod builder;
pub mod singular;

pub use builder::ModelBuilder;
pub use singular::singularize;
