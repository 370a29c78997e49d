use super::data::{Expression, Grammar};
use super::errors::GrammarError;

/// Check a parsed grammar for semantic soundness.
///
/// Two checks run in order: every rule reference must name a declared rule,
/// and no rule may be able to invoke itself before consuming input.
pub fn validate_grammar(grammar: &Grammar) -> Result<(), GrammarError> {
    check_references(grammar)?;
    check_left_recursion(grammar)?;
    Ok(())
}

/// Ensure every rule reference in the grammar resolves
fn check_references(grammar: &Grammar) -> Result<(), GrammarError> {
    for rule in grammar.rules() {
        check_references_in(grammar, rule.expression())?;
    }

    Ok(())
}

fn check_references_in(grammar: &Grammar, expression: &Expression) -> Result<(), GrammarError> {
    match expression {
        Expression::Choice(expressions) | Expression::Sequence(expressions) => {
            for expression in expressions {
                check_references_in(grammar, expression)?;
            }
            Ok(())
        }

        Expression::Labeled { expression, .. }
        | Expression::SimpleAnd(expression)
        | Expression::SimpleNot(expression)
        | Expression::Optional(expression)
        | Expression::ZeroOrMore(expression)
        | Expression::OneOrMore(expression)
        | Expression::Action { expression, .. } => check_references_in(grammar, expression),

        Expression::RuleRef(name) => {
            if grammar.get_rule(name).is_some() {
                Ok(())
            } else {
                Err(GrammarError::undefined_rule(name))
            }
        }

        Expression::SemanticAnd(_)
        | Expression::SemanticNot(_)
        | Expression::Literal(_)
        | Expression::Any
        | Expression::Class(_) => Ok(()),
    }
}

/// Reject rules that can re-enter themselves without consuming input.
///
/// Only the leftmost path is followed: for a sequence that is its first
/// element alone, so recursion hidden behind a possibly-empty first element
/// stays out of reach of this check.
fn check_left_recursion(grammar: &Grammar) -> Result<(), GrammarError> {
    for rule in grammar.rules() {
        check_left_recursion_in(grammar, rule.expression(), &mut vec![rule.name()])?;
    }

    Ok(())
}

fn check_left_recursion_in<'a>(
    grammar: &Grammar<'a>,
    expression: &Expression<'a>,
    applied: &mut Vec<&'a str>,
) -> Result<(), GrammarError> {
    match expression {
        Expression::Choice(alternatives) => {
            for alternative in alternatives {
                check_left_recursion_in(grammar, alternative, applied)?;
            }
            Ok(())
        }

        Expression::Sequence(elements) => match elements.first() {
            Some(first) => check_left_recursion_in(grammar, first, applied),
            None => Ok(()),
        },

        Expression::Labeled { expression, .. }
        | Expression::SimpleAnd(expression)
        | Expression::SimpleNot(expression)
        | Expression::Optional(expression)
        | Expression::ZeroOrMore(expression)
        | Expression::OneOrMore(expression)
        | Expression::Action { expression, .. } => {
            check_left_recursion_in(grammar, expression, applied)
        }

        Expression::RuleRef(name) => {
            if applied.contains(name) {
                return Err(GrammarError::left_recursion(name));
            }

            // missing references have already aborted in the first check
            match grammar.get_rule(name) {
                Some(rule) => {
                    applied.push(rule.name());
                    let result = check_left_recursion_in(grammar, rule.expression(), applied);
                    applied.pop();
                    result
                }
                None => Ok(()),
            }
        }

        Expression::SemanticAnd(_)
        | Expression::SemanticNot(_)
        | Expression::Literal(_)
        | Expression::Any
        | Expression::Class(_) => Ok(()),
    }
}
