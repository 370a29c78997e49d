use crate::failure::{line_col, Expectations};
use std::fmt;

/// Error raised when a text does not match the grammar it is parsed with.
///
/// The meta-grammar parser raises it for grammar source that does not match
/// the grammar syntax, and the runtime raises it for a subject string that
/// does not match a compiled grammar; generated parsers throw the same
/// shape on their side. The position is that of the rightmost failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    message: String,
    line: usize,
    column: usize,
}

impl SyntaxError {
    /// Build an error from the rightmost-failure state of a parse that
    /// stopped at `final_pos`.
    pub(crate) fn from_failures(input: &str, final_pos: usize, failures: &Expectations) -> Self {
        let message = failures.build_message(input, final_pos);
        let (line, column) = line_col(input, failures.pos());

        Self {
            message,
            line,
            column,
        }
    }

    /// Build an error pinned to a single offset.
    pub(crate) fn at(input: &str, offset: usize, message: String) -> Self {
        let (line, column) = line_col(input, offset);

        Self {
            message,
            line,
            column,
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the 1-based line number of the failure
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the 1-based column number of the failure
    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

/// Error raised by [the semantic checks](`super::validate_grammar`) on a
/// parsed grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarError {
    content: GrammarErrorContent,
}

impl GrammarError {
    pub(crate) fn undefined_rule(name: &str) -> Self {
        Self {
            content: GrammarErrorContent::UndefinedRule(name.to_string()),
        }
    }

    pub(crate) fn left_recursion(name: &str) -> Self {
        Self {
            content: GrammarErrorContent::LeftRecursion(name.to_string()),
        }
    }

    /// Get the error's content
    pub fn content(&self) -> &GrammarErrorContent {
        &self.content
    }
}

/// Content of a [`GrammarError`]
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarErrorContent {
    /// A rule reference names a rule that is not declared
    UndefinedRule(String),

    /// A rule can invoke itself before consuming any input
    LeftRecursion(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.content {
            GrammarErrorContent::UndefinedRule(name) => {
                write!(f, "Referenced rule \"{}\" does not exist.", name)
            }
            GrammarErrorContent::LeftRecursion(name) => {
                write!(f, "Left recursion detected for rule \"{}\".", name)
            }
        }
    }
}
