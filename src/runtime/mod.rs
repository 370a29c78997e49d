//! # Grammar runtime
//!
//! In-process execution of [checked grammars](`crate::compiler::validate_grammar`),
//! mirroring the behavior of the generated JavaScript parsers. Embedded
//! actions and predicates are host-language text; an [`ActionHandler`] is
//! the seam through which an embedder evaluates them.

mod data;
mod executor;

pub use data::*;
pub use executor::*;

pub use crate::compiler::SyntaxError;
