//! Line terminator helpers shared by the indent rewriters and the block rewriter.

/// True when the line is nothing but its terminator.
///
/// Whitespace-only lines such as `"  \n"` are not bare terminators.
pub fn is_bare_terminator(line: &str) -> bool {
    line == "\n" || line == "\r\n"
}

/// Split text into lines, each keeping its own terminator.
///
/// Only the final line may lack a terminator. `\r\n` stays attached to its line.
pub fn split_lines_keeping_terminators(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}
