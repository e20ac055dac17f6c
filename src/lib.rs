//! Run the `black` formatter on Python code blocks embedded in Markdown files.
//!
//! Files are rewritten in place, line by line. Lines inside a ` ```python ` block are
//! buffered up to the closing ` ``` `, stripped of their common indent, piped through the
//! formatter and written back with the indent restored. Fence lines are never touched.

pub mod error;
pub mod exit_codes;
pub mod fence;
pub mod formatter;
pub mod in_place;
pub mod indent;
pub mod invocation;
pub mod rewriter;
pub mod utils;

pub use error::RewriteError;
pub use formatter::{Format, FormatterCommand, FormatterError, FormatterOutput};
pub use indent::{dedent, detect_indent, indent};
pub use invocation::{Invocation, RunArgs, split_args};
pub use rewriter::{BlockRewriter, Cursor, FileReport, RewriteOptions, RunSummary, rewrite_file, rewrite_files, rewrite_str};
