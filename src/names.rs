//! Card names
//!
//! Every card name mentioned in rules text is replaced by a placeholder so the
//! grammar never sees free-form names:
//!
//!     - the card's own name (and short name) becomes `SELF`
//!     - the name of the card that created an object becomes `PARENT`
//!     - any other name becomes its canonical token from the [NameTable]
//!
//! The table is filled in two phases (see [crate::card::Catalog]): every card
//! name is registered before any text is resolved, because resolving one card's
//! text may need to recognize another card's name.

pub mod candidates;
pub mod resolver;
pub mod short;
pub mod table;

pub use candidates::{potential_names, Candidate};
pub use resolver::{Indicator, NameResolver, Resolution};
pub use short::{face_self_names, short_name};
pub use table::{canonical_token, DeferredNames, Discoveries, NameScope, NameTable};
