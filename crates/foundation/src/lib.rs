//! Ludeme Foundation
//!
//! Primitive types shared by every ludeme crate: the graph element a
//! constraint works on, and the fixed-universe bitsets that static analysis
//! aggregates over a rule tree.

pub mod flags;
pub mod site;

pub use flags::{
    Concept, ConceptSet, ContextField, ContextFieldSet, GameFlag, GameFlags,
};
pub use site::SiteType;
