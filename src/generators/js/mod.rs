//! JavaScript parser synthesis.
//!
//! Turns a checked grammar into the source text of a standalone packrat
//! parser: one `parse_<rule>` function per rule, a memoization cache keyed
//! by rule and position, and rightmost-failure bookkeeping for error
//! reports. The emitted text is a single expression; evaluating it in a
//! JavaScript host yields the parser object.

mod gen_matchers;

use super::templates::{format_code, TemplateVars, UniqueNames};
use crate::compiler::{Grammar, Rule};
use gen_matchers::gen_expression;

/// Emission state shared across one generation
pub(crate) struct InternalState {
    pub(crate) names: UniqueNames,
}

/// Generate the JavaScript source of a parser for the given grammar.
///
/// The grammar is expected to have gone through
/// [validation](crate::compiler::validate_grammar) and
/// [simplification](crate::compiler::simplify_grammar) first. The output is
/// deterministic for identical grammars.
pub fn gen_js_parser(grammar: &Grammar) -> String {
    let mut state = InternalState {
        names: UniqueNames::new(),
    };

    let rule_functions = grammar
        .rules()
        .iter()
        .map(|rule| gen_rule(&mut state, rule))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut vars = TemplateVars::new();
    vars.set("initializer", grammar.initializer().unwrap_or(""));
    vars.set("ruleFunctions", rule_functions);
    vars.set("startRule", grammar.start_rule());

    format_code(
        &[
            "(function() {",
            "  var result = {",
            "    /*",
            "     * Parses the input. On success the value of the start rule is",
            "     * returned. On failure a |result.SyntaxError| is thrown, positioned",
            "     * at the rightmost point the parse managed to reach.",
            "     */",
            "    parse: function(input) {",
            "      var pos = 0;",
            "      var reportMatchFailures = true;",
            "      var rightmostMatchFailuresPos = 0;",
            "      var rightmostMatchFailuresExpected = [];",
            "      var cache = {};",
            "      ",
            "      function quote(s) {",
            "        var quoted = '\"';",
            "        for (var i = 0; i < s.length; i++) {",
            "          var ch = s.charAt(i);",
            "          var code = s.charCodeAt(i);",
            "          if (ch === '\"' || ch === '\\\\') {",
            "            quoted += '\\\\' + ch;",
            "          } else if (ch === '\\n') {",
            "            quoted += '\\\\n';",
            "          } else if (ch === '\\r') {",
            "            quoted += '\\\\r';",
            "          } else if (ch === '\\u2028' || ch === '\\u2029') {",
            "            quoted += '\\\\u' + code.toString(16).toUpperCase();",
            "          } else if (code < 32) {",
            "            quoted += '\\\\x' + (code < 16 ? '0' : '') + code.toString(16).toUpperCase();",
            "          } else {",
            "            quoted += ch;",
            "          }",
            "        }",
            "        return quoted + '\"';",
            "      }",
            "      ",
            "      function matchFailed(failure) {",
            "        if (pos < rightmostMatchFailuresPos) {",
            "          return;",
            "        }",
            "        if (pos > rightmostMatchFailuresPos) {",
            "          rightmostMatchFailuresPos = pos;",
            "          rightmostMatchFailuresExpected = [];",
            "        }",
            "        if (rightmostMatchFailuresExpected.indexOf(failure) < 0) {",
            "          rightmostMatchFailuresExpected.push(failure);",
            "        }",
            "      }",
            "      ",
            "      ${initializer}",
            "      ",
            "      ${ruleFunctions}",
            "      ",
            "      function buildErrorMessage() {",
            "        function buildExpected(failuresExpected) {",
            "          failuresExpected.sort();",
            "          switch (failuresExpected.length) {",
            "            case 0:",
            "              return 'end of input';",
            "            case 1:",
            "              return failuresExpected[0];",
            "            default:",
            "              return failuresExpected.slice(0, failuresExpected.length - 1).join(', ')",
            "                + ' or '",
            "                + failuresExpected[failuresExpected.length - 1];",
            "          }",
            "        }",
            "        ",
            "        var expected = buildExpected(rightmostMatchFailuresExpected);",
            "        var actualPos = Math.max(pos, rightmostMatchFailuresPos);",
            "        var actual = actualPos < input.length",
            "          ? quote(input.charAt(actualPos))",
            "          : 'end of input';",
            "        ",
            "        return 'Expected ' + expected + ' but ' + actual + ' found.';",
            "      }",
            "      ",
            "      function computeErrorPosition() {",
            "        var line = 1;",
            "        var column = 1;",
            "        var seenCR = false;",
            "        ",
            "        for (var i = 0; i < rightmostMatchFailuresPos; i++) {",
            "          var ch = input.charAt(i);",
            "          if (ch === '\\n') {",
            "            if (!seenCR) { line++; }",
            "            column = 1;",
            "            seenCR = false;",
            "          } else if (ch === '\\r' || ch === '\\u2028' || ch === '\\u2029') {",
            "            line++;",
            "            column = 1;",
            "            seenCR = true;",
            "          } else {",
            "            column++;",
            "            seenCR = false;",
            "          }",
            "        }",
            "        ",
            "        return { line: line, column: column };",
            "      }",
            "      ",
            "      var result = parse_${startRule}();",
            "      ",
            "      /*",
            "       * The parse is a success when the start rule matched and nothing is",
            "       * left over; anything else is reported against the rightmost",
            "       * failure.",
            "       */",
            "      if (result === null || pos !== input.length) {",
            "        var errorPosition = computeErrorPosition();",
            "        throw new this.SyntaxError(",
            "          buildErrorMessage(),",
            "          errorPosition.line,",
            "          errorPosition.column",
            "        );",
            "      }",
            "      ",
            "      return result;",
            "    },",
            "    ",
            "    /* Returns the parser source text (attached by the build step). */",
            "    toSource: function() { return this._source; }",
            "  };",
            "  ",
            "  /* Thrown when a parser encounters a syntax error. */",
            "  result.SyntaxError = function(message, line, column) {",
            "    this.name = 'SyntaxError';",
            "    this.message = message;",
            "    this.line = line;",
            "    this.column = column;",
            "  };",
            "  ",
            "  result.SyntaxError.prototype = Error.prototype;",
            "  ",
            "  return result;",
            "})()",
        ],
        &vars,
    )
}

/// Emit the parse function of one rule.
///
/// The name counters restart here so that editing one rule leaves the
/// emitted code of every other rule untouched.
fn gen_rule(state: &mut InternalState, rule: &Rule) -> String {
    state.names.reset();

    let result_var = state.names.fresh("result");
    let body = gen_expression(state, rule.expression(), &result_var);

    let mut vars = TemplateVars::new();
    vars.set("name", rule.name());
    vars.set("body", body);
    vars.set("resultVar", result_var);

    match rule.display_name() {
        Some(display_name) => {
            vars.set("displayName", display_name);

            format_code(
                &[
                    "function parse_${name}() {",
                    "  var cacheKey = '${name}@' + pos;",
                    "  var cachedResult = cache[cacheKey];",
                    "  if (cachedResult) {",
                    "    pos = cachedResult.nextPos;",
                    "    return cachedResult.result;",
                    "  }",
                    "  ",
                    "  var savedReportMatchFailures = reportMatchFailures;",
                    "  reportMatchFailures = false;",
                    "  ${body}",
                    "  reportMatchFailures = savedReportMatchFailures;",
                    "  if (reportMatchFailures && ${resultVar} === null) {",
                    "    matchFailed(${displayName|string});",
                    "  }",
                    "  ",
                    "  cache[cacheKey] = {",
                    "    nextPos: pos,",
                    "    result:  ${resultVar}",
                    "  };",
                    "  return ${resultVar};",
                    "}",
                ],
                &vars,
            )
        }
        None => format_code(
            &[
                "function parse_${name}() {",
                "  var cacheKey = '${name}@' + pos;",
                "  var cachedResult = cache[cacheKey];",
                "  if (cachedResult) {",
                "    pos = cachedResult.nextPos;",
                "    return cachedResult.result;",
                "  }",
                "  ",
                "  ${body}",
                "  ",
                "  cache[cacheKey] = {",
                "    nextPos: pos,",
                "    result:  ${resultVar}",
                "  };",
                "  return ${resultVar};",
                "}",
            ],
            &vars,
        ),
    }
}
