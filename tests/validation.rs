//! Tests for the semantic checks and the proxy-rule simplification pass.

use peggen::compiler::{
    parse_grammar, simplify_grammar, validate_grammar, Expression, GrammarErrorContent,
};

#[test]
fn accepts_a_sound_grammar() {
    let grammar = parse_grammar("a = b \"x\"\nb = \"y\"").unwrap();
    assert!(validate_grammar(&grammar).is_ok());
}

#[test]
fn rejects_undefined_rule_references() {
    let grammar = parse_grammar("a = b \"x\"").unwrap();
    let err = validate_grammar(&grammar).unwrap_err();

    assert_eq!(
        err.content(),
        &GrammarErrorContent::UndefinedRule("b".to_string())
    );
    assert_eq!(format!("{}", err), "Referenced rule \"b\" does not exist.");
}

#[test]
fn finds_references_inside_nested_expressions() {
    let grammar = parse_grammar("a = !(x:ghost)* \"x\"").unwrap();
    let err = validate_grammar(&grammar).unwrap_err();

    assert_eq!(
        err.content(),
        &GrammarErrorContent::UndefinedRule("ghost".to_string())
    );
}

#[test]
fn rejects_direct_left_recursion() {
    let grammar = parse_grammar("s = s \"a\" / \"a\"").unwrap();
    let err = validate_grammar(&grammar).unwrap_err();

    assert_eq!(
        format!("{}", err),
        "Left recursion detected for rule \"s\"."
    );
}

#[test]
fn rejects_indirect_left_recursion() {
    let grammar = parse_grammar("s = x\nx = s \"a\"").unwrap();
    let err = validate_grammar(&grammar).unwrap_err();

    assert_eq!(
        err.content(),
        &GrammarErrorContent::LeftRecursion("s".to_string())
    );
}

#[test]
fn only_the_first_sequence_element_is_followed() {
    // recursion behind a possibly-empty first element is not detected
    let grammar = parse_grammar("a = b? a\nb = \"x\"").unwrap();
    assert!(validate_grammar(&grammar).is_ok());

    // recursion through lookaheads and repetitions is
    let grammar = parse_grammar("a = !a \"x\"").unwrap();
    assert!(validate_grammar(&grammar).is_err());
}

#[test]
fn right_recursion_is_fine() {
    let grammar = parse_grammar("list = item \",\" list / item\nitem = [0-9]").unwrap();
    assert!(validate_grammar(&grammar).is_ok());
}

#[test]
fn eliminates_proxy_rules() {
    let mut grammar = parse_grammar("s = x\nx = \"a\"").unwrap();
    validate_grammar(&grammar).unwrap();
    simplify_grammar(&mut grammar);

    assert_eq!(grammar.rules().len(), 1);
    assert_eq!(grammar.start_rule(), "x");
    assert!(grammar.get_rule("s").is_none());
}

#[test]
fn eliminates_proxy_chains() {
    let mut grammar = parse_grammar("a = b\nb = c\nc = \"x\"").unwrap();
    simplify_grammar(&mut grammar);

    assert_eq!(grammar.rules().len(), 1);
    assert_eq!(grammar.start_rule(), "c");
}

#[test]
fn rewrites_references_to_the_proxy() {
    let mut grammar = parse_grammar("main = p p\np = q\nq = \"x\"").unwrap();
    simplify_grammar(&mut grammar);

    assert_eq!(grammar.rules().len(), 2);
    assert!(grammar.get_rule("p").is_none());

    match grammar.get_rule("main").unwrap().expression() {
        Expression::Sequence(elements) => {
            assert_eq!(elements[0], Expression::RuleRef("q"));
            assert_eq!(elements[1], Expression::RuleRef("q"));
        }
        other => panic!("expected a sequence, got {:?}", other),
    }
}

#[test]
fn simplification_is_idempotent() {
    let mut grammar = parse_grammar("main = p\np = q\nq = \"x\" main?").unwrap();
    simplify_grammar(&mut grammar);
    let once = format!("{:?}", grammar);

    simplify_grammar(&mut grammar);
    assert_eq!(format!("{:?}", grammar), once);
}

#[test]
fn non_proxy_rules_are_kept() {
    let mut grammar = parse_grammar("a = b c\nb = \"x\"\nc = b?").unwrap();
    simplify_grammar(&mut grammar);

    // `c = b?` is not a proxy: its body is an optional, not a bare reference
    assert_eq!(grammar.rules().len(), 3);
}
