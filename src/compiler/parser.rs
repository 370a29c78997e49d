use super::data::{CharClass, Expression, Grammar, Rule};
use super::errors::SyntaxError;
use super::singles::{self, SingleError};
use crate::failure::Expectations;
use crate::strings::quote_js_string;

/// Parse a grammar source text into its [abstract tree](`Grammar`).
///
/// Only the syntax is checked here; rule references and recursion are the
/// business of [the validator](`super::validate_grammar`).
pub fn parse_grammar(input: &str) -> Result<Grammar, SyntaxError> {
    MetaParser::new(input).grammar()
}

/// Recursive-descent parser for the grammar syntax itself.
///
/// Failure handling mirrors the parsers the crate generates: token-level
/// mismatches record what was expected at the rightmost position reached,
/// reporting is silenced inside lookaheads and single-token matchers, and
/// the final error is built from that record.
struct MetaParser<'a> {
    input: &'a str,

    /// Current position (byte offset)
    pos: usize,

    failures: Expectations,

    /// Cleared inside lookaheads and single-token matchers
    report_failures: bool,
}

impl<'a> MetaParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failures: Expectations::new(),
            report_failures: true,
        }
    }

    /// `Grammar := __ Initializer? Rule+`, consuming the whole input
    fn grammar(mut self) -> Result<Grammar<'a>, SyntaxError> {
        self.skip_ws();

        let initializer = self.initializer();

        let mut rules: Vec<Rule<'a>> = Vec::new();
        while let Some(rule) = self.rule()? {
            // a redefined name replaces the earlier rule in place
            match rules.iter_mut().find(|known| known.name == rule.name) {
                Some(slot) => *slot = rule,
                None => rules.push(rule),
            }
        }

        if rules.is_empty() || self.pos < self.input.len() {
            return Err(SyntaxError::from_failures(
                self.input,
                self.pos,
                &self.failures,
            ));
        }

        let start_rule = rules[0].name;

        Ok(Grammar {
            rules,
            start_rule,
            initializer,
        })
    }

    /// `Initializer := Action ';'?`
    fn initializer(&mut self) -> Option<&'a str> {
        let code = self.code_block()?;
        self.semicolon();
        Some(code)
    }

    /// `Rule := Identifier Literal? '=' Choice ';'?`
    fn rule(&mut self) -> Result<Option<Rule<'a>>, SyntaxError> {
        let start = self.pos;

        let name = match self.identifier() {
            Some(name) => name,
            None => return Ok(None),
        };

        let display_name = self.literal();

        if !self.token("=") {
            self.pos = start;
            return Ok(None);
        }

        let expression = self.choice()?;
        self.semicolon();

        Ok(Some(Rule {
            name,
            display_name,
            expression,
        }))
    }

    /// `Choice := Sequence ('/' Sequence)*`
    ///
    /// A single alternative collapses to itself.
    fn choice(&mut self) -> Result<Expression<'a>, SyntaxError> {
        let mut alternatives = vec![self.sequence()?];

        while self.token("/") {
            alternatives.push(self.sequence()?);
        }

        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Expression::Choice(alternatives)
        })
    }

    /// `Sequence := Labeled+ Action? | Labeled*`
    ///
    /// A single element collapses to itself; a trailing action wraps the
    /// collapsed sequence.
    fn sequence(&mut self) -> Result<Expression<'a>, SyntaxError> {
        let mut elements = Vec::new();
        while let Some(element) = self.labeled()? {
            elements.push(element);
        }

        if !elements.is_empty() {
            if let Some(code) = self.code_block() {
                return Ok(Expression::Action {
                    expression: Box::new(collapse_sequence(elements)),
                    code,
                });
            }
        }

        Ok(collapse_sequence(elements))
    }

    /// `Labeled := (Identifier ':')? Prefixed`
    fn labeled(&mut self) -> Result<Option<Expression<'a>>, SyntaxError> {
        let start = self.pos;

        if let Some(label) = self.identifier() {
            if self.token(":") {
                return match self.prefixed()? {
                    Some(expression) => Ok(Some(Expression::Labeled {
                        label,
                        expression: Box::new(expression),
                    })),
                    None => {
                        self.pos = start;
                        Ok(None)
                    }
                };
            }

            self.pos = start;
        }

        self.prefixed()
    }

    /// `Prefixed := '&' Action | '&' Suffixed | '!' Action | '!' Suffixed | Suffixed`
    fn prefixed(&mut self) -> Result<Option<Expression<'a>>, SyntaxError> {
        let start = self.pos;

        if self.token("&") {
            if let Some(code) = self.code_block() {
                return Ok(Some(Expression::SemanticAnd(code)));
            }

            return match self.suffixed()? {
                Some(expression) => Ok(Some(Expression::SimpleAnd(Box::new(expression)))),
                None => {
                    self.pos = start;
                    Ok(None)
                }
            };
        }

        if self.token("!") {
            if let Some(code) = self.code_block() {
                return Ok(Some(Expression::SemanticNot(code)));
            }

            return match self.suffixed()? {
                Some(expression) => Ok(Some(Expression::SimpleNot(Box::new(expression)))),
                None => {
                    self.pos = start;
                    Ok(None)
                }
            };
        }

        self.suffixed()
    }

    /// `Suffixed := Primary ('?' | '*' | '+')?`
    fn suffixed(&mut self) -> Result<Option<Expression<'a>>, SyntaxError> {
        let primary = match self.primary()? {
            Some(primary) => primary,
            None => return Ok(None),
        };

        let expression = if self.token("?") {
            Expression::Optional(Box::new(primary))
        } else if self.token("*") {
            Expression::ZeroOrMore(Box::new(primary))
        } else if self.token("+") {
            Expression::OneOrMore(Box::new(primary))
        } else {
            primary
        };

        Ok(Some(expression))
    }

    /// `Primary := Identifier !(Literal? '=') | Literal | '.' | Class | '(' Choice ')'`
    fn primary(&mut self) -> Result<Option<Expression<'a>>, SyntaxError> {
        let start = self.pos;

        // a rule reference, unless this is the next rule's header
        if let Some(name) = self.identifier() {
            if !self.at_rule_header() {
                return Ok(Some(Expression::RuleRef(name)));
            }

            self.pos = start;
            return Ok(None);
        }

        if let Some(value) = self.literal() {
            return Ok(Some(Expression::Literal(value)));
        }

        if self.token(".") {
            return Ok(Some(Expression::Any));
        }

        if let Some(class) = self.class()? {
            return Ok(Some(Expression::Class(class)));
        }

        if self.token("(") {
            let expression = self.choice()?;

            return if self.token(")") {
                Ok(Some(expression))
            } else {
                self.pos = start;
                Ok(None)
            };
        }

        Ok(None)
    }

    /// Check whether the position sits on the remainder of a rule header,
    /// i.e. `Literal? '='` (the identifier has already been consumed).
    /// Never consumes.
    fn at_rule_header(&mut self) -> bool {
        let saved_pos = self.pos;
        let saved_report = self.report_failures;
        self.report_failures = false;

        let _ = self.literal();
        let is_header = self.input[self.pos..].starts_with('=');

        self.pos = saved_pos;
        self.report_failures = saved_report;

        is_header
    }

    /// Eat an optional semicolon terminator
    fn semicolon(&mut self) {
        let _ = self.token(";");
    }

    /// Match an exact token and skip the whitespace behind it
    fn token(&mut self, token: &str) -> bool {
        if self.input[self.pos..].starts_with(token) {
            self.pos += token.len();
            self.skip_ws();
            true
        } else {
            let expected = quote_js_string(token);
            self.fail(&expected);
            false
        }
    }

    /// Match an identifier token
    fn identifier(&mut self) -> Option<&'a str> {
        let input = self.input;

        match singles::identifier(&input[self.pos..]) {
            Some((name, len)) => {
                self.pos += len;
                self.skip_ws();
                Some(name)
            }
            None => {
                self.fail("identifier");
                None
            }
        }
    }

    /// Match a string literal token
    fn literal(&mut self) -> Option<String> {
        match singles::literal(&self.input[self.pos..]) {
            Some((value, len)) => {
                self.pos += len;
                self.skip_ws();
                Some(value)
            }
            None => {
                self.fail("literal");
                None
            }
        }
    }

    /// Match a character class token
    fn class(&mut self) -> Result<Option<CharClass<'a>>, SyntaxError> {
        let input = self.input;

        match singles::class(&input[self.pos..]) {
            Ok(Some((class, len))) => {
                self.pos += len;
                self.skip_ws();
                Ok(Some(class))
            }
            Ok(None) => {
                self.fail("character class");
                Ok(None)
            }
            Err(SingleError { offset, message }) => {
                Err(SyntaxError::at(input, self.pos + offset, message))
            }
        }
    }

    /// Match a brace-delimited code block token
    fn code_block(&mut self) -> Option<&'a str> {
        let input = self.input;

        match singles::code_block(&input[self.pos..]) {
            Some((code, len)) => {
                self.pos += len;
                self.skip_ws();
                Some(code)
            }
            None => {
                self.fail("action");
                None
            }
        }
    }

    /// Skip whitespace and comments between tokens
    fn skip_ws(&mut self) {
        loop {
            let rest = &self.input[self.pos..];

            if let Some(c) = rest.chars().next() {
                if singles::is_whitespace(c) {
                    self.pos += c.len_utf8();
                    continue;
                }
            }

            if rest.starts_with("//") {
                self.pos += rest
                    .char_indices()
                    .find(|(_, c)| singles::is_line_terminator(*c))
                    .map(|(idx, _)| idx)
                    .unwrap_or_else(|| rest.len());
                continue;
            }

            if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => {
                        self.pos += 2 + end + 2;
                        continue;
                    }
                    // unterminated comment: stop in front of it
                    None => break,
                }
            }

            break;
        }

        self.fail("whitespace");
    }

    /// Record a failed expectation at the current position
    fn fail(&mut self, expected: &str) {
        if self.report_failures {
            self.failures.record(self.pos, expected);
        }
    }
}

/// A single-element sequence stands for the element itself
fn collapse_sequence(mut elements: Vec<Expression>) -> Expression {
    if elements.len() == 1 {
        elements.remove(0)
    } else {
        Expression::Sequence(elements)
    }
}
