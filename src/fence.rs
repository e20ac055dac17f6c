//! Recognition of the fence lines that delimit Python code blocks.

/// Trimmed content of a line opening a Python code block.
pub const OPEN_SENTINEL: &str = "```python";

/// Trimmed content of a line closing a code block.
pub const CLOSE_SENTINEL: &str = "```";

/// Kind of fence a line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence {
    Open,
    Close,
}

/// Classify a line by its trimmed content.
///
/// Only exact matches count: ` ```py `, ` ```python3 ` or ` ```python title="x" ` are
/// ordinary lines, as are tilde fences.
pub fn classify(line: &str) -> Option<Fence> {
    match line.trim() {
        OPEN_SENTINEL => Some(Fence::Open),
        CLOSE_SENTINEL => Some(Fence::Close),
        _ => None,
    }
}
