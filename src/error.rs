use crate::formatter::FormatterError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error while rewriting a Markdown file.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Failed to access file {}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to write diagnostics")]
    Diagnostics(#[source] io::Error),

    #[error(transparent)]
    Formatter(#[from] FormatterError),

    #[error("Formatter exited with code {exit_code} on code block at {}:{line}", .path.display())]
    FormatterFailed { path: PathBuf, line: usize, exit_code: i32 },
}

impl RewriteError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the whole run must stop, as opposed to skipping the current file.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::FormatterFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, RewriteError>;
