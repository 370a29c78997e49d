use super::errors::SyntaxError;

/// Format a syntax error in a human-readable way, showing the offending
/// line with a caret under the failure column.
pub fn pretty_format_syntax_err(input: &str, err: &SyntaxError) -> String {
    let line = input.lines().nth(err.line() - 1).unwrap_or("");
    let padding = " ".repeat(err.column() - 1 + err.line().to_string().len() + 3);

    format!(
        "ERROR: At line {}, column {}:\n\n{} | {}\n{}^\n{}{}",
        err.line(),
        err.column(),
        err.line(),
        line,
        padding,
        padding,
        err.message()
    )
}
