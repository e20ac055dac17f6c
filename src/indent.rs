//! Common-indent detection and the dedent/indent rewriters applied around the formatter.

use crate::utils::line_ending::is_bare_terminator;

/// Characters tried, in priority order, when guessing a block's indent.
const INDENT_CHARS: [char; 2] = [' ', '\t'];

/// Guess the indent prefix shared by all lines of a block.
///
/// Lines that are exactly a bare terminator are ignored, so an unindented blank line
/// never forces an empty result. Spaces are tried before tabs; the first character with
/// a positive common run wins. Returns an empty string when neither qualifies.
pub fn detect_indent<S: AsRef<str>>(lines: &[S]) -> String {
    for ch in INDENT_CHARS {
        let count = lines
            .iter()
            .map(|line| line.as_ref())
            .filter(|line| !is_bare_terminator(line))
            .filter_map(|line| leading_run(line, ch))
            .min()
            .unwrap_or(0);
        if count > 0 {
            return ch.to_string().repeat(count);
        }
    }
    String::new()
}

/// Length of the run of `ch` at the start of `line`, or `None` when the line consists of
/// nothing but `ch` (no other character follows the run).
fn leading_run(line: &str, ch: char) -> Option<usize> {
    let run = line.chars().take_while(|&c| c == ch).count();
    if run < line.chars().count() { Some(run) } else { None }
}

/// Strip `prefix.len()` bytes from the start of every line.
///
/// Callers pass a prefix obtained from [`detect_indent`] on the same lines, so every
/// non-blank line starts with it. Lines shorter than the prefix become empty.
pub fn dedent<S: AsRef<str>>(lines: &[S], prefix: &str) -> Vec<String> {
    let width = prefix.len();
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            line.get(width..).unwrap_or_default().to_string()
        })
        .collect()
}

/// Prepend `prefix` to every line except empty lines and bare terminators.
pub fn indent<S: AsRef<str>>(lines: &[S], prefix: &str) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.is_empty() || is_bare_terminator(line) {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}
