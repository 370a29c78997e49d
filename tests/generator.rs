//! Tests for the JavaScript emission and the grammar-source regeneration.

use peggen::compiler::{parse_grammar, simplify_grammar, validate_grammar};
use peggen::generators::{gen_js_parser, gen_peg};
use peggen::{compile, compile_to_source};

#[test]
fn emission_is_deterministic() {
    let grammar = "a = b \"x\" / [0-9]+\nb = \"y\"?";

    assert_eq!(
        compile_to_source(grammar).unwrap(),
        compile_to_source(grammar).unwrap()
    );
}

#[test]
fn emits_one_function_per_rule() {
    let source = compile_to_source("a = b\nb = \"x\" c\nc = \"y\"").unwrap();

    // `a` is a proxy and is gone by emission time
    assert!(!source.contains("function parse_a()"));
    assert!(source.contains("function parse_b()"));
    assert!(source.contains("function parse_c()"));
    assert!(source.contains("var result = parse_b();"));
}

#[test]
fn rule_functions_probe_the_cache_first() {
    let source = compile_to_source("start = \"x\"").unwrap();

    assert!(source.contains("var cacheKey = 'start@' + pos;"));
    assert!(source.contains("pos = cachedResult.nextPos;"));
    assert!(source.contains("return cachedResult.result;"));
}

#[test]
fn name_counters_restart_at_every_rule() {
    let source = compile_to_source("a = \"x\" \"y\"\nb = \"z\" \"w\"").unwrap();

    // both rules build their value into [result1, result2], thanks to the
    // per-rule counter reset
    assert_eq!(
        source.matches("var result0 = [result1, result2];").count(),
        2
    );
    assert_eq!(source.matches("var savedPos0 = pos;").count(), 2);
}

#[test]
fn literals_are_quoted_and_measured_in_code_units() {
    let source = compile_to_source("start = \"a\\\"b\"").unwrap();
    assert!(source.contains("if (input.substr(pos, 3) === \"a\\\"b\")"));

    // an astral character spans two UTF-16 code units
    let source = compile_to_source("start = \"𝄞\"").unwrap();
    assert!(source.contains("input.substr(pos, 2)"));
}

#[test]
fn literal_failures_report_the_quoted_text() {
    let source = compile_to_source("start = \"a\"").unwrap();
    assert!(source.contains("matchFailed(\"\\\"a\\\"\");"));
}

#[test]
fn classes_compile_to_direct_comparisons() {
    let source = compile_to_source("start = [a-z_]").unwrap();
    assert!(source.contains("(ch0 >= \"a\" && ch0 <= \"z\") || ch0 === \"_\""));
    assert!(source.contains("matchFailed(\"[a-z_]\");"));

    let source = compile_to_source("start = [^a]").unwrap();
    assert!(source.contains("ch0 !== '' && !(ch0 === \"a\")"));

    let source = compile_to_source("start = []").unwrap();
    assert!(source.contains("if (false) {"));

    let source = compile_to_source("start = [^]").unwrap();
    assert!(source.contains("if (ch0 !== '') {"));
}

#[test]
fn the_dot_consumes_one_character() {
    let source = compile_to_source("start = .").unwrap();

    assert!(source.contains("if (input.length > pos) {"));
    assert!(source.contains("matchFailed('any character');"));
}

#[test]
fn actions_splat_labeled_elements() {
    let source = compile_to_source("start = a:\"x\" b:\"y\" { return a + b }").unwrap();

    assert!(source.contains("(function(a, b) { return a + b })(result1[0], result1[1])"));
}

#[test]
fn actions_over_plain_expressions_still_receive_the_value() {
    let source = compile_to_source("start = \"a\"* { return arguments[0].length }").unwrap();

    assert!(source.contains("(function() { return arguments[0].length })(result1)"));
}

#[test]
fn lookaheads_save_position_and_reporting() {
    let source = compile_to_source("start = &\"a\" .").unwrap();

    assert!(source.contains("var savedPos0 = pos;"));
    assert!(source.contains("var savedReportMatchFailures0 = reportMatchFailures;"));
    assert!(source.contains("reportMatchFailures = false;"));
    assert!(source.contains("reportMatchFailures = savedReportMatchFailures0;"));

    // the lookahead leaves no value behind, so the sequence collapses to
    // the dot's result
    assert!(source.contains("var result0 = result2;"));
}

#[test]
fn display_named_rules_silence_their_body() {
    let source = compile_to_source("integer \"integer\" = [0-9]+").unwrap();

    assert!(source.contains("var savedReportMatchFailures = reportMatchFailures;"));
    assert!(source.contains("matchFailed(\"integer\");"));
}

#[test]
fn the_initializer_lands_inside_the_parse_function() {
    let source = compile_to_source("{ var depth = 0; }\nstart = \"x\"").unwrap();

    let initializer = source.find("var depth = 0;").unwrap();
    let first_rule = source.find("function parse_start()").unwrap();
    assert!(initializer < first_rule);
}

#[test]
fn the_emitted_parser_is_a_single_expression() {
    let source = compile_to_source("start = \"x\"").unwrap();

    assert!(source.starts_with("(function() {"));
    assert!(source.ends_with("})()"));
    assert!(source.contains("toSource: function() { return this._source; }"));
    assert!(source.contains("result.SyntaxError = function(message, line, column) {"));
    assert!(source.contains("function computeErrorPosition() {"));
    assert!(source.contains("'Expected ' + expected + ' but ' + actual + ' found.'"));
}

#[test]
fn semantic_predicates_wrap_their_code() {
    let source = compile_to_source("start = &{ return ok; } \"x\"").unwrap();
    assert!(source.contains("(function() { return ok; })() ? '' : null;"));

    let source = compile_to_source("start = !{ return bad; } \"x\"").unwrap();
    assert!(source.contains("(function() { return bad; })() ? null : '';"));
}

#[test]
fn nested_code_keeps_its_indentation() {
    let source = compile_to_source("start = \"a\" \"b\"").unwrap();

    // the second element's matcher sits one level inside the first's
    let indent_of = |needle: &str| {
        let line = source
            .lines()
            .find(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("no line contains {:?}", needle));
        line.chars().take_while(|c| *c == ' ').count()
    };

    assert_eq!(
        indent_of("=== \"b\""),
        indent_of("=== \"a\"") + 2
    );
}

#[test]
fn regenerated_grammars_reach_a_fixed_point() {
    let source = "{ var n = 0; }\nsum = l:num \"+\"? r:(num / \"-\")* { return l + r }\nnum \"number\" = [0-9]+ / !\"x\" .";

    let grammar = parse_grammar(source).unwrap();
    let once = gen_peg(&grammar);

    let reparsed = parse_grammar(&once).unwrap();
    assert_eq!(reparsed, grammar);

    let twice = gen_peg(&reparsed);
    assert_eq!(once, twice);
}

#[test]
fn regeneration_parenthesizes_where_needed() {
    let grammar = parse_grammar("a = (\"x\" / \"y\") \"z\" (\"m\"*)*").unwrap();
    let regenerated = gen_peg(&grammar);

    assert_eq!(regenerated, "a = (\"x\" / \"y\") \"z\" (\"m\"*)*");
}

#[test]
fn regenerated_classes_escape_their_specials() {
    let grammar = parse_grammar("a = [\\]a-z\\-/]").unwrap();
    let regenerated = gen_peg(&grammar);

    assert_eq!(regenerated, "a = [\\]a-z\\-\\/]");
}

#[test]
fn the_parser_object_keeps_its_source() {
    let parser = compile("start = \"x\"").unwrap();

    assert_eq!(parser.to_source(), compile_to_source("start = \"x\"").unwrap());
}

#[test]
fn validated_trees_emit_like_the_facade() {
    let text = "s = x\nx = \"a\"";

    let mut grammar = parse_grammar(text).unwrap();
    validate_grammar(&grammar).unwrap();
    simplify_grammar(&mut grammar);

    assert_eq!(gen_js_parser(&grammar), compile_to_source(text).unwrap());
}
