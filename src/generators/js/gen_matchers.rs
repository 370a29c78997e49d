use super::InternalState;
use crate::compiler::{CharClass, ClassPart, Expression};
use crate::generators::templates::{format_code, TemplateVars};
use crate::strings::{quote_js_string, utf16_len};

/// Emit the matcher of one expression.
///
/// The returned code leaves the match outcome in `result_var`: the semantic
/// value on success, `null` on failure. Matchers that consume input move
/// `pos` themselves and put it back when they fail halfway.
pub(crate) fn gen_expression(
    state: &mut InternalState,
    expression: &Expression,
    result_var: &str,
) -> String {
    match expression {
        Expression::Choice(alternatives) => gen_choice(state, alternatives, result_var),
        Expression::Sequence(elements) => gen_sequence(state, elements, result_var),
        Expression::Labeled { expression, .. } => gen_expression(state, expression, result_var),
        Expression::SimpleAnd(expression) => gen_lookahead(state, expression, result_var, false),
        Expression::SimpleNot(expression) => gen_lookahead(state, expression, result_var, true),
        Expression::SemanticAnd(code) => gen_predicate(code, result_var, false),
        Expression::SemanticNot(code) => gen_predicate(code, result_var, true),
        Expression::Optional(expression) => gen_optional(state, expression, result_var),
        Expression::ZeroOrMore(expression) => gen_repeat(state, expression, result_var, false),
        Expression::OneOrMore(expression) => gen_repeat(state, expression, result_var, true),
        Expression::Action { expression, code } => gen_action(state, expression, code, result_var),
        Expression::RuleRef(name) => {
            let mut vars = TemplateVars::new();
            vars.set("result", result_var).set("name", *name);
            format_code(&["var ${result} = parse_${name}();"], &vars)
        }
        Expression::Literal(value) => gen_literal(value, result_var),
        Expression::Any => gen_any(result_var),
        Expression::Class(class) => gen_class(state, class, result_var),
    }
}

fn gen_literal(value: &str, result_var: &str) -> String {
    let mut vars = TemplateVars::new();
    vars.set("result", result_var)
        .set("value", value)
        .set("length", utf16_len(value).to_string())
        .set("expected", quote_js_string(value));

    format_code(
        &[
            "if (input.substr(pos, ${length}) === ${value|string}) {",
            "  var ${result} = ${value|string};",
            "  pos += ${length};",
            "} else {",
            "  var ${result} = null;",
            "  if (reportMatchFailures) {",
            "    matchFailed(${expected|string});",
            "  }",
            "}",
        ],
        &vars,
    )
}

fn gen_any(result_var: &str) -> String {
    let mut vars = TemplateVars::new();
    vars.set("result", result_var);

    format_code(
        &[
            "if (input.length > pos) {",
            "  var ${result} = input.charAt(pos);",
            "  pos++;",
            "} else {",
            "  var ${result} = null;",
            "  if (reportMatchFailures) {",
            "    matchFailed('any character');",
            "  }",
            "}",
        ],
        &vars,
    )
}

fn gen_class(state: &mut InternalState, class: &CharClass, result_var: &str) -> String {
    let char_var = state.names.fresh("ch");

    let mut vars = TemplateVars::new();
    vars.set("result", result_var)
        .set("ch", char_var.as_str())
        .set("condition", class_condition(class, &char_var))
        .set("rawText", class.raw_text());

    format_code(
        &[
            "var ${ch} = input.charAt(pos);",
            "if (${condition}) {",
            "  var ${result} = ${ch};",
            "  pos++;",
            "} else {",
            "  var ${result} = null;",
            "  if (reportMatchFailures) {",
            "    matchFailed(${rawText|string});",
            "  }",
            "}",
        ],
        &vars,
    )
}

/// Build the test deciding whether the class matches the character held in
/// `char_var`. Past the end of input `charAt` reads as an empty string,
/// which must never match, inverted or not.
fn class_condition(class: &CharClass, char_var: &str) -> String {
    let parts = class
        .parts()
        .iter()
        .map(|part| match part {
            ClassPart::Single(c) => {
                format!("{} === {}", char_var, quote_js_string(&c.to_string()))
            }
            ClassPart::Range(low, high) => format!(
                "({} >= {} && {} <= {})",
                char_var,
                quote_js_string(&low.to_string()),
                char_var,
                quote_js_string(&high.to_string())
            ),
        })
        .collect::<Vec<_>>()
        .join(" || ");

    if class.inverted() {
        if parts.is_empty() {
            format!("{} !== ''", char_var)
        } else {
            format!("{} !== '' && !({})", char_var, parts)
        }
    } else if parts.is_empty() {
        "false".to_string()
    } else {
        parts
    }
}

fn gen_sequence(state: &mut InternalState, elements: &[Expression], result_var: &str) -> String {
    let saved_pos = state.names.fresh("savedPos");

    let element_results: Vec<String> = elements
        .iter()
        .map(|_| state.names.fresh("result"))
        .collect();
    let element_codes: Vec<String> = elements
        .iter()
        .zip(&element_results)
        .map(|(element, var)| gen_expression(state, element, var))
        .collect();

    // innermost code: every element matched. A lone contributing value is
    // handed through bare, everything else is collected into an array.
    let contributing: Vec<&str> = elements
        .iter()
        .zip(&element_results)
        .filter(|(element, _)| element.contributes_value())
        .map(|(_, var)| var.as_str())
        .collect();

    let mut vars = TemplateVars::new();
    vars.set("result", result_var);
    let mut code = if contributing.len() == 1 {
        vars.set("element", contributing[0]);
        format_code(&["var ${result} = ${element};"], &vars)
    } else {
        vars.set("elements", contributing.join(", "));
        format_code(&["var ${result} = [${elements}];"], &vars)
    };

    for (element_code, element_result) in element_codes.iter().zip(&element_results).rev() {
        let mut vars = TemplateVars::new();
        vars.set("elementCode", element_code.as_str())
            .set("elementResult", element_result.as_str())
            .set("inner", code)
            .set("result", result_var)
            .set("savedPos", saved_pos.as_str());

        code = format_code(
            &[
                "${elementCode}",
                "if (${elementResult} !== null) {",
                "  ${inner}",
                "} else {",
                "  var ${result} = null;",
                "  pos = ${savedPos};",
                "}",
            ],
            &vars,
        );
    }

    let mut vars = TemplateVars::new();
    vars.set("savedPos", saved_pos).set("code", code);
    format_code(&["var ${savedPos} = pos;", "${code}"], &vars)
}

fn gen_choice(state: &mut InternalState, alternatives: &[Expression], result_var: &str) -> String {
    let alternative_results: Vec<String> = alternatives
        .iter()
        .map(|_| state.names.fresh("result"))
        .collect();
    let alternative_codes: Vec<String> = alternatives
        .iter()
        .zip(&alternative_results)
        .map(|(alternative, var)| gen_expression(state, alternative, var))
        .collect();

    // innermost code: every alternative failed
    let mut vars = TemplateVars::new();
    vars.set("result", result_var);
    let mut code = format_code(&["var ${result} = null;"], &vars);

    for (alternative_code, alternative_result) in
        alternative_codes.iter().zip(&alternative_results).rev()
    {
        let mut vars = TemplateVars::new();
        vars.set("alternativeCode", alternative_code.as_str())
            .set("alternativeResult", alternative_result.as_str())
            .set("inner", code)
            .set("result", result_var);

        code = format_code(
            &[
                "${alternativeCode}",
                "if (${alternativeResult} !== null) {",
                "  var ${result} = ${alternativeResult};",
                "} else {",
                "  ${inner}",
                "}",
            ],
            &vars,
        );
    }

    code
}

fn gen_optional(state: &mut InternalState, expression: &Expression, result_var: &str) -> String {
    let expression_result = state.names.fresh("result");
    let expression_code = gen_expression(state, expression, &expression_result);

    let mut vars = TemplateVars::new();
    vars.set("expressionCode", expression_code)
        .set("expressionResult", expression_result)
        .set("result", result_var);

    format_code(
        &[
            "${expressionCode}",
            "var ${result} = ${expressionResult} !== null ? ${expressionResult} : '';",
        ],
        &vars,
    )
}

fn gen_repeat(
    state: &mut InternalState,
    expression: &Expression,
    result_var: &str,
    at_least_once: bool,
) -> String {
    let expression_result = state.names.fresh("result");
    let first_code = gen_expression(state, expression, &expression_result);
    let next_code = gen_expression(state, expression, &expression_result);

    let mut vars = TemplateVars::new();
    vars.set("firstCode", first_code)
        .set("nextCode", next_code)
        .set("expressionResult", expression_result)
        .set("result", result_var);

    if at_least_once {
        format_code(
            &[
                "${firstCode}",
                "if (${expressionResult} !== null) {",
                "  var ${result} = [];",
                "  while (${expressionResult} !== null) {",
                "    ${result}.push(${expressionResult});",
                "    ${nextCode}",
                "  }",
                "} else {",
                "  var ${result} = null;",
                "}",
            ],
            &vars,
        )
    } else {
        format_code(
            &[
                "var ${result} = [];",
                "${firstCode}",
                "while (${expressionResult} !== null) {",
                "  ${result}.push(${expressionResult});",
                "  ${nextCode}",
                "}",
            ],
            &vars,
        )
    }
}

fn gen_lookahead(
    state: &mut InternalState,
    expression: &Expression,
    result_var: &str,
    negative: bool,
) -> String {
    let saved_pos = state.names.fresh("savedPos");
    let saved_report = state.names.fresh("savedReportMatchFailures");
    let expression_result = state.names.fresh("result");
    let expression_code = gen_expression(state, expression, &expression_result);

    let mut vars = TemplateVars::new();
    vars.set("expressionCode", expression_code)
        .set("expressionResult", expression_result)
        .set("result", result_var)
        .set("savedPos", saved_pos)
        .set("savedReport", saved_report);

    if negative {
        format_code(
            &[
                "var ${savedPos} = pos;",
                "var ${savedReport} = reportMatchFailures;",
                "reportMatchFailures = false;",
                "${expressionCode}",
                "reportMatchFailures = ${savedReport};",
                "if (${expressionResult} === null) {",
                "  var ${result} = '';",
                "} else {",
                "  var ${result} = null;",
                "  pos = ${savedPos};",
                "}",
            ],
            &vars,
        )
    } else {
        format_code(
            &[
                "var ${savedPos} = pos;",
                "var ${savedReport} = reportMatchFailures;",
                "reportMatchFailures = false;",
                "${expressionCode}",
                "reportMatchFailures = ${savedReport};",
                "if (${expressionResult} !== null) {",
                "  var ${result} = '';",
                "  pos = ${savedPos};",
                "} else {",
                "  var ${result} = null;",
                "}",
            ],
            &vars,
        )
    }
}

fn gen_predicate(code: &str, result_var: &str, negative: bool) -> String {
    let (on_true, on_false) = if negative { ("null", "''") } else { ("''", "null") };

    let mut vars = TemplateVars::new();
    vars.set("code", code)
        .set("result", result_var)
        .set("onTrue", on_true)
        .set("onFalse", on_false);

    format_code(
        &["var ${result} = (function() {${code}})() ? ${onTrue} : ${onFalse};"],
        &vars,
    )
}

fn gen_action(
    state: &mut InternalState,
    expression: &Expression,
    code: &str,
    result_var: &str,
) -> String {
    let expression_result = state.names.fresh("result");
    let expression_code = gen_expression(state, expression, &expression_result);
    let (params, args) = action_interface(expression, &expression_result);

    let mut vars = TemplateVars::new();
    vars.set("expressionCode", expression_code)
        .set("expressionResult", expression_result)
        .set("result", result_var)
        .set("code", code)
        .set("params", params)
        .set("args", args);

    format_code(
        &[
            "${expressionCode}",
            "var ${result} = ${expressionResult} !== null",
            "  ? (function(${params}) {${code}})(${args})",
            "  : null;",
        ],
        &vars,
    )
}

/// Formal parameters and actual arguments of an action wrapper.
///
/// A sequence contributes one parameter per labeled element, bound by its
/// position in the sequence's value list (or to the whole value when the
/// sequence collapsed to a single contributor); a lone labeled expression
/// contributes its label. Anything else gets an empty parameter list, with
/// the whole matched value still applied so the code can reach it
/// positionally.
fn action_interface(expression: &Expression, expression_result: &str) -> (String, String) {
    match expression {
        Expression::Sequence(elements) => {
            let contributing = elements
                .iter()
                .filter(|element| element.contributes_value())
                .count();

            let mut params = Vec::new();
            let mut args = Vec::new();
            let mut value_index = 0;

            for element in elements {
                if let Expression::Labeled { label, .. } = element {
                    params.push((*label).to_string());
                    args.push(if contributing == 1 {
                        expression_result.to_string()
                    } else {
                        format!("{}[{}]", expression_result, value_index)
                    });
                }

                if element.contributes_value() {
                    value_index += 1;
                }
            }

            (params.join(", "), args.join(", "))
        }
        Expression::Labeled { label, .. } => {
            ((*label).to_string(), expression_result.to_string())
        }
        _ => (String::new(), expression_result.to_string()),
    }
}
