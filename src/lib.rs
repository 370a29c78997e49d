//! # Peggen
//!
//! Peggen is a compiler for parsing expression grammars: it reads a grammar
//! written in a PEG syntax and produces a standalone JavaScript parser for
//! the language the grammar describes.
//!
//! The pipeline has three stages. [The meta-grammar parser](compiler::parse_grammar)
//! turns grammar text into an abstract grammar tree, [the validator](compiler::validate_grammar)
//! resolves rule references and rejects left recursion, and
//! [the generator](generators::gen_js_parser) emits the parser source.
//! [The runtime](runtime::execute) interprets checked grammars in-process
//! with the same semantics as the emitted parsers, which makes grammars
//! testable without a JavaScript host.
//!
//! ## Usage
//!
//! ```rust
//! let parser = peggen::compile("main = \"ab\"* ;").unwrap();
//!
//! // run the grammar in-process
//! let value = parser.parse("abab").unwrap();
//! assert_eq!(value.as_list().unwrap().len(), 2);
//!
//! // or take the standalone JavaScript parser
//! let js = parser.to_source();
//! assert!(js.contains("function parse_main()"));
//! ```

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

pub mod compiler;
mod failure;
pub mod generators;
pub mod runtime;
mod strings;

use compiler::{Grammar, GrammarError, SyntaxError};
use runtime::{ActionHandler, RuntimeContext, Value};
use std::fmt;

/// Compile a grammar into a [`Parser`].
///
/// Runs the whole pipeline: parse, semantic checks, proxy-rule
/// elimination, emission. The parser keeps both the simplified grammar for
/// in-process execution and the emitted JavaScript source.
pub fn compile(grammar: &str) -> Result<Parser, CompileError> {
    let mut ast = compiler::parse_grammar(grammar)?;
    compiler::validate_grammar(&ast)?;
    compiler::simplify_grammar(&mut ast);

    let source = generators::gen_js_parser(&ast);

    Ok(Parser {
        grammar: ast,
        source,
    })
}

/// Compile a grammar straight to the source text of its JavaScript parser.
pub fn compile_to_source(grammar: &str) -> Result<String, CompileError> {
    compile(grammar).map(|parser| parser.source)
}

/// A compiled grammar: the emitted JavaScript parser source plus an
/// in-process interpreter over the same grammar.
pub struct Parser<'a> {
    grammar: Grammar<'a>,
    source: String,
}

impl<'a> Parser<'a> {
    /// Parse an input with the built-in runtime, without host evaluation of
    /// embedded code (matched values pass through action nodes unchanged).
    pub fn parse(&self, input: &str) -> Result<Value, SyntaxError> {
        runtime::execute(&RuntimeContext {
            grammar: &self.grammar,
            subject: input,
            actions: None,
        })
    }

    /// Parse an input, evaluating actions and semantic predicates with the
    /// given handler.
    pub fn parse_with(&self, input: &str, actions: ActionHandler) -> Result<Value, SyntaxError> {
        runtime::execute(&RuntimeContext {
            grammar: &self.grammar,
            subject: input,
            actions: Some(actions),
        })
    }

    /// The simplified grammar the parser was compiled from
    pub fn grammar(&self) -> &Grammar<'a> {
        &self.grammar
    }

    /// Source text of the standalone JavaScript parser
    pub fn to_source(&self) -> &str {
        &self.source
    }
}

/// Error raised by [`compile`]: either the grammar text does not parse, or
/// it parses but is semantically unsound.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The grammar text does not match the grammar syntax
    Syntax(SyntaxError),

    /// A semantic check rejected the grammar
    Grammar(GrammarError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Syntax(err) => write!(f, "{}", err),
            CompileError::Grammar(err) => write!(f, "{}", err),
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::Syntax(err)
    }
}

impl From<GrammarError> for CompileError {
    fn from(err: GrammarError) -> Self {
        CompileError::Grammar(err)
    }
}
