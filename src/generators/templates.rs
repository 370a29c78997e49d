//! # Code templates
//!
//! Small string-template engine backing the parser synthesizer. Template
//! parts are substituted one by one, re-indented, and joined with newlines:
//! `${name}` inserts a variable, `${name|filter}` runs it through a filter
//! first. The only filter is `string`, which quotes the value as a
//! JavaScript string literal.
//!
//! Unknown variables and filters panic. Templates are compiled into the
//! crate, so a bad reference is an emitter bug rather than a user error.

use crate::strings::quote_js_string;
use std::collections::HashMap;

/// Variable table for [`format_code`]
#[derive(Debug, Default)]
pub(crate) struct TemplateVars {
    vars: HashMap<&'static str, String>,
}

impl TemplateVars {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind a variable
    pub(crate) fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name, value.into());
        self
    }

    fn get(&self, name: &str) -> &str {
        match self.vars.get(name) {
            Some(value) => value,
            None => panic!("template references unknown variable `{}`", name),
        }
    }
}

/// Render template parts into a block of code.
///
/// Every part is substituted on its own, then re-indented: when the part's
/// first line starts with whitespace, that prefix is repeated in front of
/// all following lines, so a multi-line variable keeps the visual indent of
/// the line it was interpolated into. Parts are joined with newlines.
pub(crate) fn format_code(parts: &[&str], vars: &TemplateVars) -> String {
    parts
        .iter()
        .map(|part| indent(&substitute(part, vars)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn substitute(part: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(part.len());
    let mut rest = part;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = match after.find('}') {
            Some(end) => end,
            None => panic!("template interpolation is missing its closing brace"),
        };

        let interpolation = &after[..end];
        let (name, filter) = match interpolation.find('|') {
            Some(bar) => (&interpolation[..bar], Some(&interpolation[bar + 1..])),
            None => (interpolation, None),
        };

        if !is_name(name) || !filter.map_or(true, is_name) {
            panic!("malformed template interpolation `${{{}}}`", interpolation);
        }

        let value = vars.get(name);
        match filter {
            None => out.push_str(value),
            Some("string") => out.push_str(&quote_js_string(value)),
            Some(other) => panic!("template references unknown filter `{}`", other),
        }

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn indent(part: &str) -> String {
    let mut lines = part.split('\n');

    let first = match lines.next() {
        Some(first) => first,
        None => return String::new(),
    };

    let prefix: String = first
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();

    if prefix.is_empty() {
        return part.to_string();
    }

    let mut out = first.to_string();
    for line in lines {
        out.push('\n');
        out.push_str(&prefix);
        out.push_str(line);
    }

    out
}

/// Generator of unique local variable names.
///
/// Counters are kept per prefix and reset at every rule boundary, so that a
/// local grammar edit only moves the names inside its own rule.
#[derive(Debug, Default)]
pub(crate) struct UniqueNames {
    counters: HashMap<String, usize>,
}

impl UniqueNames {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Next unused name for the prefix
    pub(crate) fn fresh(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let name = format!("{}{}", prefix, counter);
        *counter += 1;
        name
    }

    /// Forget all counters
    pub(crate) fn reset(&mut self) {
        self.counters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_variables() {
        let mut vars = TemplateVars::new();
        vars.set("name", "answer").set("value", "42");

        assert_eq!(
            format_code(&["var ${name} = ${value};"], &vars),
            "var answer = 42;"
        );
    }

    #[test]
    fn joins_parts_with_newlines() {
        let vars = TemplateVars::new();
        assert_eq!(format_code(&["a", "b"], &vars), "a\nb");
    }

    #[test]
    fn string_filter_quotes_values() {
        let mut vars = TemplateVars::new();
        vars.set("value", "a\"b");

        assert_eq!(
            format_code(&["f(${value|string});"], &vars),
            "f(\"a\\\"b\");"
        );
    }

    #[test]
    fn preserves_indentation_of_multiline_values() {
        let mut vars = TemplateVars::new();
        vars.set("body", "first;\nsecond;");

        assert_eq!(
            format_code(&["if (x) {", "  ${body}", "}"], &vars),
            "if (x) {\n  first;\n  second;\n}"
        );
    }

    #[test]
    #[should_panic(expected = "unknown variable")]
    fn panics_on_unknown_variables() {
        let _ = format_code(&["${missing}"], &TemplateVars::new());
    }

    #[test]
    #[should_panic(expected = "unknown filter")]
    fn panics_on_unknown_filters() {
        let mut vars = TemplateVars::new();
        vars.set("x", "y");
        let _ = format_code(&["${x|upper}"], &vars);
    }

    #[test]
    fn unique_names_count_per_prefix_and_reset() {
        let mut names = UniqueNames::new();

        assert_eq!(names.fresh("result"), "result0");
        assert_eq!(names.fresh("result"), "result1");
        assert_eq!(names.fresh("savedPos"), "savedPos0");

        names.reset();
        assert_eq!(names.fresh("result"), "result0");
    }
}
