//! Rightmost-failure tracking, shared by the meta-grammar parser and the
//! grammar runtime.
//!
//! Both parsers report errors the same way: token-level mismatches record
//! what was expected at the furthest position reached, and the final error
//! message and position are derived from that record once the parse gives
//! up.

use crate::strings::quote_js_string;

/// Furthest-failure state of a single parse.
#[derive(Debug)]
pub(crate) struct Expectations {
    /// Byte offset of the furthest recorded failure
    pos: usize,

    /// Descriptions of what was expected there
    expected: Vec<String>,
}

impl Expectations {
    pub(crate) fn new() -> Self {
        Self {
            pos: 0,
            expected: Vec::new(),
        }
    }

    /// Record a failed expectation at the given offset.
    ///
    /// Failures behind the furthest position are ignored; a failure beyond
    /// it resets the set. Membership is by string equality.
    pub(crate) fn record(&mut self, at: usize, expected: &str) {
        if at < self.pos {
            return;
        }

        if at > self.pos {
            self.pos = at;
            self.expected.clear();
        }

        if !self.expected.iter().any(|e| e == expected) {
            self.expected.push(expected.to_string());
        }
    }

    /// Offset of the furthest recorded failure
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Build the `Expected X but Y found.` message for a parse that stopped
    /// at `final_pos`.
    pub(crate) fn build_message(&self, input: &str, final_pos: usize) -> String {
        let mut expected: Vec<&str> = self.expected.iter().map(|e| e.as_str()).collect();
        expected.sort_unstable();

        let expected = match expected.len() {
            0 => "end of input".to_string(),
            1 => expected[0].to_string(),
            n => format!("{} or {}", expected[..n - 1].join(", "), expected[n - 1]),
        };

        let actual_pos = final_pos.max(self.pos).min(input.len());
        let actual = match input[actual_pos..].chars().next() {
            Some(c) => quote_js_string(&c.to_string()),
            None => "end of input".to_string(),
        };

        format!("Expected {} but {} found.", expected, actual)
    }
}

/// Compute the 1-based line and column of a byte offset.
///
/// A `\r\n` pair counts as a single line break; `\r`, U+2028 and U+2029 are
/// line breaks of their own.
pub(crate) fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    let mut seen_cr = false;

    for (idx, c) in input.char_indices() {
        if idx >= offset {
            break;
        }

        match c {
            '\n' => {
                if !seen_cr {
                    line += 1;
                }
                column = 1;
                seen_cr = false;
            }
            '\r' | '\u{2028}' | '\u{2029}' => {
                line += 1;
                column = 1;
                seen_cr = true;
            }
            _ => {
                column += 1;
                seen_cr = false;
            }
        }
    }

    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_furthest_failure() {
        let mut failures = Expectations::new();
        failures.record(3, "\"a\"");
        failures.record(1, "\"b\"");
        failures.record(3, "\"c\"");
        failures.record(3, "\"a\"");

        assert_eq!(failures.pos(), 3);
        assert_eq!(
            failures.build_message("xxxy", 0),
            "Expected \"a\" or \"c\" but \"y\" found."
        );
    }

    #[test]
    fn a_longer_failure_resets_the_set() {
        let mut failures = Expectations::new();
        failures.record(1, "\"a\"");
        failures.record(2, "\"b\"");

        assert_eq!(failures.build_message("xxx", 0), "Expected \"b\" but \"x\" found.");
    }

    #[test]
    fn empty_set_reads_as_end_of_input() {
        let failures = Expectations::new();
        assert_eq!(failures.build_message("", 0), "Expected end of input but end of input found.");
    }

    #[test]
    fn counts_crlf_as_one_line_break() {
        assert_eq!(line_col("a\r\nb", 3), (2, 1));
        assert_eq!(line_col("a\rb", 2), (2, 1));
        assert_eq!(line_col("a\nb", 2), (2, 1));
        assert_eq!(line_col("a\u{2028}b", 4), (2, 1));
        assert_eq!(line_col("ab", 1), (1, 2));
    }
}
