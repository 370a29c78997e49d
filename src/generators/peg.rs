//! Grammar-source regeneration.
//!
//! Turns an abstract grammar tree back into grammar source text. Comments,
//! blank lines and the original layout are not recoverable; the output is a
//! canonical one-rule-per-line form that parses back to the same tree.

use crate::compiler::{CharClass, ClassPart, Expression, Grammar};
use crate::strings::{quote_for_class, quote_js_string};

// Binding strengths, loosest to tightest. A sub-expression rendered where a
// tighter level is required gets parenthesized.
const CHOICE: u8 = 0;
const SEQUENCE: u8 = 1;
const LABELED: u8 = 2;
const PREFIXED: u8 = 3;
const SUFFIXED: u8 = 4;
const PRIMARY: u8 = 5;

/// Generate grammar source from a syntax tree.
///
/// Useful to get back to readable source after the simplification passes.
pub fn gen_peg(grammar: &Grammar) -> String {
    let mut out = String::new();

    if let Some(code) = grammar.initializer() {
        out.push_str(&format!("{{{}}}\n\n", code));
    }

    let rules = grammar
        .rules()
        .iter()
        .map(|rule| match rule.display_name() {
            Some(display_name) => format!(
                "{} {} = {}",
                rule.name(),
                quote_js_string(display_name),
                gen_peg_expression(rule.expression(), CHOICE)
            ),
            None => format!(
                "{} = {}",
                rule.name(),
                gen_peg_expression(rule.expression(), CHOICE)
            ),
        })
        .collect::<Vec<_>>()
        .join("\n");

    out.push_str(&rules);
    out
}

/// Render one expression, parenthesizing it when its own binding strength
/// is below what the surrounding construct requires.
fn gen_peg_expression(expression: &Expression, required: u8) -> String {
    let (text, level) = render(expression);

    if level < required {
        format!("({})", text)
    } else {
        text
    }
}

fn render(expression: &Expression) -> (String, u8) {
    match expression {
        Expression::Choice(alternatives) => (
            alternatives
                .iter()
                .map(|alternative| gen_peg_expression(alternative, SEQUENCE))
                .collect::<Vec<_>>()
                .join(" / "),
            CHOICE,
        ),

        Expression::Sequence(elements) => (
            elements
                .iter()
                .map(|element| gen_peg_expression(element, LABELED))
                .collect::<Vec<_>>()
                .join(" "),
            SEQUENCE,
        ),

        Expression::Action { expression, code } => (
            format!("{} {{{}}}", gen_peg_expression(expression, LABELED), code),
            SEQUENCE,
        ),

        Expression::Labeled { label, expression } => (
            format!("{}:{}", label, gen_peg_expression(expression, PREFIXED)),
            LABELED,
        ),

        Expression::SimpleAnd(expression) => (
            format!("&{}", gen_peg_expression(expression, SUFFIXED)),
            PREFIXED,
        ),

        Expression::SimpleNot(expression) => (
            format!("!{}", gen_peg_expression(expression, SUFFIXED)),
            PREFIXED,
        ),

        Expression::SemanticAnd(code) => (format!("&{{{}}}", code), PREFIXED),
        Expression::SemanticNot(code) => (format!("!{{{}}}", code), PREFIXED),

        Expression::Optional(expression) => (
            format!("{}?", gen_peg_expression(expression, PRIMARY)),
            SUFFIXED,
        ),

        Expression::ZeroOrMore(expression) => (
            format!("{}*", gen_peg_expression(expression, PRIMARY)),
            SUFFIXED,
        ),

        Expression::OneOrMore(expression) => (
            format!("{}+", gen_peg_expression(expression, PRIMARY)),
            SUFFIXED,
        ),

        Expression::RuleRef(name) => ((*name).to_string(), PRIMARY),
        Expression::Literal(value) => (quote_js_string(value), PRIMARY),
        Expression::Any => (".".to_string(), PRIMARY),
        Expression::Class(class) => (render_class(class), PRIMARY),
    }
}

/// Rebuild a class from its parts; the raw source text would go stale after
/// tree rewrites.
fn render_class(class: &CharClass) -> String {
    let parts = class
        .parts()
        .iter()
        .map(|part| match part {
            ClassPart::Single(c) => quote_for_class(*c),
            ClassPart::Range(low, high) => {
                format!("{}-{}", quote_for_class(*low), quote_for_class(*high))
            }
        })
        .collect::<String>();

    format!("[{}{}]", if class.inverted() { "^" } else { "" }, parts)
}
