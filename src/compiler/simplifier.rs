//! Proxy-rule elimination.
//!
//! A proxy rule's whole body is a single reference to another rule; it adds
//! a call level for nothing. The pass rewrites every reference to the proxy
//! to point at its target, retargets the start rule when needed, and drops
//! the proxy, repeating until no proxy is left.

use super::data::{Expression, Grammar};

/// Remove all proxy rules from a grammar. Running it again is a no-op.
pub fn simplify_grammar(grammar: &mut Grammar) {
    while let Some((proxy, target)) = find_proxy(grammar) {
        for rule in &mut grammar.rules {
            replace_rule_refs(&mut rule.expression, proxy, target);
        }

        if grammar.start_rule == proxy {
            grammar.start_rule = target;
        }

        grammar.remove_rule(proxy);
    }
}

/// Find a rule whose body is a plain reference to another rule.
///
/// A rule referencing itself is not a proxy; the recursion check has its
/// own opinion on those.
fn find_proxy<'a>(grammar: &Grammar<'a>) -> Option<(&'a str, &'a str)> {
    grammar.rules().iter().find_map(|rule| match rule.expression() {
        Expression::RuleRef(target) if *target != rule.name() => Some((rule.name(), *target)),
        _ => None,
    })
}

fn replace_rule_refs<'a>(expression: &mut Expression<'a>, from: &str, to: &'a str) {
    match expression {
        Expression::Choice(expressions) | Expression::Sequence(expressions) => {
            for expression in expressions {
                replace_rule_refs(expression, from, to);
            }
        }

        Expression::Labeled { expression, .. }
        | Expression::SimpleAnd(expression)
        | Expression::SimpleNot(expression)
        | Expression::Optional(expression)
        | Expression::ZeroOrMore(expression)
        | Expression::OneOrMore(expression)
        | Expression::Action { expression, .. } => replace_rule_refs(expression, from, to),

        Expression::RuleRef(name) => {
            if *name == from {
                *name = to;
            }
        }

        Expression::SemanticAnd(_)
        | Expression::SemanticNot(_)
        | Expression::Literal(_)
        | Expression::Any
        | Expression::Class(_) => {}
    }
}
