const INDENT_UNIT: &str = "    ";

const INDENT_TRIGGERS: [&str; 11] = [
    "if", "for", "while", "def", "class", "try", "except", "with", "else:", "elif", "finally:",
];

const DEDENT_TRIGGERS: [&str; 3] = ["return", "pass", "break"];

/// Reshapes flat recognized text into block-indented code.
///
/// Single pass over the lines, one indentation unit per nesting level.
/// A line that opens a block (leading keyword or trailing colon) indents
/// everything after it; the line immediately following such a trigger is
/// exempt from both trigger checks, so a recognized header/body pair does
/// not cascade. Leading `return`/`pass`/`break` dedents, floored at zero.
/// Blank lines pass through untouched and leave all state alone.
///
/// This is a lexical heuristic, not a parser; the output is best-effort
/// and tuned for indentation-sensitive code.
pub fn reconstruct(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    let mut indent_level: usize = 0;
    let mut just_indented = false;

    for line in raw.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push('\n');
            continue;
        }

        for _ in 0..indent_level {
            out.push_str(INDENT_UNIT);
        }
        out.push_str(trimmed);
        out.push('\n');

        if just_indented {
            just_indented = false;
            continue;
        }

        if INDENT_TRIGGERS.iter().any(|kw| trimmed.starts_with(kw)) || trimmed.ends_with(':') {
            indent_level += 1;
            just_indented = true;
        }
        if DEDENT_TRIGGERS.iter().any(|kw| trimmed.starts_with(kw)) {
            indent_level = indent_level.saturating_sub(1);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::reconstruct;

    #[test]
    fn plain_text_passes_through_with_trailing_newline() {
        assert_eq!(reconstruct("x = 1\ny = 2"), "x = 1\ny = 2\n");
    }

    #[test]
    fn colon_trigger_indents_following_line() {
        assert_eq!(reconstruct("if x:\n  y"), "if x:\n    y\n");
    }

    #[test]
    fn dedent_is_suppressed_right_after_an_indent() {
        assert_eq!(reconstruct("for i in r:\nreturn x"), "for i in r:\n    return x\n");
        // the suppressed `return` never dedents, so the level carries on
        assert_eq!(
            reconstruct("for i in r:\nreturn x\nz"),
            "for i in r:\n    return x\n    z\n"
        );
    }

    #[test]
    fn dedent_applies_outside_the_suppression_window() {
        assert_eq!(
            reconstruct("while t:\nx = f()\nreturn x\nprint(x)"),
            "while t:\n    x = f()\n    return x\nprint(x)\n"
        );
    }

    #[test]
    fn blank_lines_pass_through_without_touching_state() {
        assert_eq!(
            reconstruct("def f():\n\nx = 1"),
            "def f():\n\n    x = 1\n"
        );
    }

    #[test]
    fn blank_line_does_not_consume_the_suppression_window() {
        // the blank bypasses everything, so `return` on the next line is
        // still the first line inside the window and skips both checks
        assert_eq!(
            reconstruct("if a:\n\nreturn b\nc"),
            "if a:\n\n    return b\n    c\n"
        );
    }

    #[test]
    fn back_to_back_headers_do_not_stack() {
        // the second header lands in the suppression window, so it is
        // emitted one level in but opens no block of its own
        assert_eq!(
            reconstruct("def f():\nfor i in r:\nprint(i)"),
            "def f():\n    for i in r:\n    print(i)\n"
        );
    }

    #[test]
    fn separated_headers_stack_indent_units() {
        assert_eq!(
            reconstruct("def f():\nx = 1\nfor i in r:\nprint(i)"),
            "def f():\n    x = 1\n    for i in r:\n        print(i)\n"
        );
    }

    #[test]
    fn dedent_floors_at_zero() {
        assert_eq!(reconstruct("pass\npass\nx"), "pass\npass\nx\n");
    }

    #[test]
    fn leading_keyword_without_colon_still_indents() {
        // literal prefix match, as the keyword table specifies
        assert_eq!(reconstruct("elif x\ny"), "elif x\n    y\n");
    }

    #[test]
    fn input_whitespace_is_discarded_before_reindenting() {
        assert_eq!(
            reconstruct("  if x:\n        y\n\tz"),
            "if x:\n    y\n    z\n"
        );
    }

    #[test]
    fn trailing_newline_becomes_trailing_blank_line() {
        assert_eq!(reconstruct("x = 1\n"), "x = 1\n\n");
    }

    #[test]
    fn empty_input_yields_single_newline() {
        assert_eq!(reconstruct(""), "\n");
    }
}
