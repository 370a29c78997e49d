use super::data::Value;
use crate::compiler::{Expression, Grammar, Rule, SyntaxError};
use crate::failure::Expectations;
use crate::strings::quote_js_string;
use std::collections::HashMap;

/// Match a subject string against a [checked grammar](crate::compiler::validate_grammar).
///
/// The interpreter follows the generated parsers step for step: packrat
/// memoization per (rule, position), prioritized choice, rightmost-failure
/// bookkeeping. On success the semantic value of the start rule is
/// returned; the whole subject must be consumed. On failure the error
/// carries the message and position of the rightmost failure, exactly like
/// a generated parser would throw.
pub fn execute(ctx: &RuntimeContext) -> Result<Value, SyntaxError> {
    let mut machine = Machine {
        grammar: ctx.grammar,
        subject: ctx.subject,
        actions: ctx.actions.as_ref(),
        pos: 0,
        cache: HashMap::new(),
        failures: Expectations::new(),
        report_failures: true,
    };

    let result = machine.apply_rule(ctx.grammar.start_rule());

    match result {
        Some(value) if machine.pos == ctx.subject.len() => Ok(value),
        _ => Err(SyntaxError::from_failures(
            ctx.subject,
            machine.pos,
            &machine.failures,
        )),
    }
}

/// Runtime execution context
pub struct RuntimeContext<'a, 'b> {
    /// Checked and simplified grammar
    pub grammar: &'a Grammar<'b>,

    /// Subject string to match
    pub subject: &'a str,

    /// Optional evaluator for actions and semantic predicates.
    ///
    /// Without one, actions pass the matched value through unchanged and
    /// predicates hold, which is enough to recognize inputs and inspect raw
    /// matches.
    pub actions: Option<ActionHandler>,
}

/// Host evaluation hook for embedded code fragments.
///
/// Called with the fragment's source text and the values selected by the
/// argument-splatting rules. Semantic predicates go through the same
/// handler with no arguments; only the truthiness of their result matters.
///
/// ## Example
///
/// ```rust
/// use peggen::runtime::{ActionHandler, Value};
///
/// let handler: ActionHandler = Box::new(|code, args| match code.trim() {
///     "return chars.length" => Value::Num(args[0].value.as_list().map_or(0, |l| l.len()) as f64),
///     _ => Value::Null,
/// });
/// ```
pub type ActionHandler = Box<dyn Fn(&str, &[ActionArg]) -> Value>;

/// One argument passed to an [`ActionHandler`]
#[derive(Debug, Clone, PartialEq)]
pub struct ActionArg<'a> {
    /// Label the value is bound to, when there is one
    pub label: Option<&'a str>,

    /// The matched value
    pub value: Value,
}

/// Per-parse state of the interpreter
struct Machine<'a, 'b> {
    grammar: &'a Grammar<'b>,
    subject: &'a str,
    actions: Option<&'a ActionHandler>,

    /// Current position (byte offset)
    pos: usize,

    /// Memoized rule outcomes: (rule, entry position) to (exit position,
    /// result)
    cache: HashMap<(&'b str, usize), (usize, Option<Value>)>,

    failures: Expectations,

    /// Cleared inside lookaheads and display-named rules
    report_failures: bool,
}

impl<'a, 'b> Machine<'a, 'b> {
    /// Invoke a rule at the current position, through the cache
    fn apply_rule(&mut self, name: &str) -> Option<Value> {
        let grammar = self.grammar;
        let rule: &'a Rule<'b> = match grammar.get_rule(name) {
            Some(rule) => rule,
            // dangling references only survive in unchecked grammars
            None => return None,
        };

        let key = (rule.name(), self.pos);
        if let Some((next_pos, result)) = self.cache.get(&key) {
            self.pos = *next_pos;
            return result.clone();
        }

        let saved_report = self.report_failures;
        if rule.display_name().is_some() {
            self.report_failures = false;
        }

        let result = self.match_expression(rule.expression());

        if let Some(display_name) = rule.display_name() {
            self.report_failures = saved_report;
            if result.is_none() {
                self.fail(display_name);
            }
        }

        self.cache.insert(key, (self.pos, result.clone()));
        result
    }

    /// Match one expression at the current position.
    ///
    /// `None` is the failure sentinel; every successful value, including
    /// the empty string and the empty list, is `Some`.
    fn match_expression(&mut self, expression: &'a Expression<'b>) -> Option<Value> {
        match expression {
            Expression::Choice(alternatives) => {
                for alternative in alternatives {
                    if let Some(value) = self.match_expression(alternative) {
                        return Some(value);
                    }
                }
                None
            }

            Expression::Sequence(elements) => {
                let saved_pos = self.pos;
                let mut values = Vec::with_capacity(elements.len());

                for element in elements {
                    match self.match_expression(element) {
                        Some(value) => {
                            if element.contributes_value() {
                                values.push(value);
                            }
                        }
                        None => {
                            self.pos = saved_pos;
                            return None;
                        }
                    }
                }

                // a lone contributing value is handed through bare
                Some(if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::List(values)
                })
            }

            Expression::Labeled { expression, .. } => self.match_expression(expression),

            Expression::SimpleAnd(expression) => {
                let saved_pos = self.pos;
                let result =
                    self.without_reporting(|machine| machine.match_expression(expression));

                match result {
                    Some(_) => {
                        self.pos = saved_pos;
                        Some(Value::empty())
                    }
                    None => None,
                }
            }

            Expression::SimpleNot(expression) => {
                let saved_pos = self.pos;
                let result =
                    self.without_reporting(|machine| machine.match_expression(expression));

                match result {
                    Some(_) => {
                        self.pos = saved_pos;
                        None
                    }
                    None => Some(Value::empty()),
                }
            }

            Expression::SemanticAnd(code) => {
                if self.evaluate_predicate(code) {
                    Some(Value::empty())
                } else {
                    None
                }
            }

            Expression::SemanticNot(code) => {
                if self.evaluate_predicate(code) {
                    None
                } else {
                    Some(Value::empty())
                }
            }

            Expression::Optional(expression) => Some(
                self.match_expression(expression)
                    .unwrap_or_else(Value::empty),
            ),

            Expression::ZeroOrMore(expression) => {
                let mut values = Vec::new();
                while let Some(value) = self.match_expression(expression) {
                    values.push(value);
                }
                Some(Value::List(values))
            }

            Expression::OneOrMore(expression) => {
                let first = self.match_expression(expression)?;

                let mut values = vec![first];
                while let Some(value) = self.match_expression(expression) {
                    values.push(value);
                }
                Some(Value::List(values))
            }

            Expression::Action { expression, code } => {
                let matched = self.match_expression(expression)?;

                match self.actions {
                    Some(handler) => {
                        let args = action_args(expression, &matched);
                        Some(handler(code, &args))
                    }
                    None => Some(matched),
                }
            }

            Expression::RuleRef(name) => self.apply_rule(name),

            Expression::Literal(value) => {
                if self.subject[self.pos..].starts_with(value.as_str()) {
                    self.pos += value.len();
                    Some(Value::Str(value.clone()))
                } else {
                    let expected = quote_js_string(value);
                    self.fail(&expected);
                    None
                }
            }

            Expression::Any => match self.subject[self.pos..].chars().next() {
                Some(c) => {
                    self.pos += c.len_utf8();
                    Some(Value::Str(c.to_string()))
                }
                None => {
                    self.fail("any character");
                    None
                }
            },

            Expression::Class(class) => match self.subject[self.pos..].chars().next() {
                Some(c) if class.matches(c) => {
                    self.pos += c.len_utf8();
                    Some(Value::Str(c.to_string()))
                }
                _ => {
                    self.fail(class.raw_text());
                    None
                }
            },
        }
    }

    /// Evaluate a semantic predicate through the handler
    fn evaluate_predicate(&self, code: &str) -> bool {
        match self.actions {
            Some(handler) => handler(code, &[]).is_truthy(),
            None => true,
        }
    }

    /// Run a matcher with failure reporting silenced
    fn without_reporting<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.report_failures;
        self.report_failures = false;
        let result = f(self);
        self.report_failures = saved;
        result
    }

    /// Record a failed expectation at the current position
    fn fail(&mut self, expected: &str) {
        if self.report_failures {
            self.failures.record(self.pos, expected);
        }
    }
}

/// Select the values an action receives, per the splatting rules: labeled
/// sequence elements by their position in the sequence's value list (or
/// the whole value when the sequence collapsed to a single contributor), a
/// lone labeled value by itself, anything else as a single unnamed
/// argument.
fn action_args<'b>(expression: &Expression<'b>, matched: &Value) -> Vec<ActionArg<'b>> {
    match expression {
        Expression::Sequence(elements) => {
            let contributing = elements
                .iter()
                .filter(|element| element.contributes_value())
                .count();

            let mut args = Vec::new();
            let mut value_index = 0;

            for element in elements {
                if let Expression::Labeled { label, .. } = element {
                    let value = match matched {
                        Value::List(values) if contributing != 1 => values[value_index].clone(),
                        bare => bare.clone(),
                    };

                    args.push(ActionArg {
                        label: Some(*label),
                        value,
                    });
                }

                if element.contributes_value() {
                    value_index += 1;
                }
            }

            args
        }

        Expression::Labeled { label, .. } => vec![ActionArg {
            label: Some(*label),
            value: matched.clone(),
        }],

        _ => vec![ActionArg {
            label: None,
            value: matched.clone(),
        }],
    }
}
