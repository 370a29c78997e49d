//! # Generators
//!
//! Back half of the pipeline: emission of a standalone JavaScript parser
//! from a [checked grammar](`crate::compiler::validate_grammar`), plus
//! regeneration of grammar source from the tree.

mod js;
pub mod peg;
mod templates;

pub use self::js::gen_js_parser;
pub use self::peg::gen_peg;
