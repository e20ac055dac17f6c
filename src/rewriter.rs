//! Line-oriented rewriting of Python code blocks.
//!
//! [`BlockRewriter`] is a two-state machine fed one line at a time. Outside a block every
//! line is echoed. After an opening fence, lines are buffered until the closing fence;
//! the buffer is then dedented, run through the formatter, re-indented and written out
//! ahead of the (unchanged) closing fence.

use crate::error::{Result, RewriteError};
use crate::fence::{self, Fence};
use crate::formatter::Format;
use crate::in_place::InPlaceFile;
use crate::indent::{dedent, detect_indent, indent};
use crate::utils::line_ending::split_lines_keeping_terminators;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options shared by every file of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Treat a non-zero formatter exit as an error that abandons the current file.
    pub strict: bool,
}

/// Position of a line: the file it belongs to and its 1-based number within that file.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'p> {
    pub path: &'p Path,
    pub line: usize,
}

/// Outcome of rewriting one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Blocks run through the formatter.
    pub blocks_formatted: usize,
    /// Blocks still open at end of file, whose content was dropped.
    pub blocks_lost: usize,
}

#[derive(Debug)]
struct OpenBlock {
    start_line: usize,
    lines: Vec<String>,
}

#[derive(Debug)]
enum State {
    Outside,
    Buffering(OpenBlock),
}

pub struct BlockRewriter<'a> {
    formatter: &'a dyn Format,
    diagnostics: &'a mut dyn Write,
    options: RewriteOptions,
    state: State,
    report: FileReport,
}

impl<'a> BlockRewriter<'a> {
    pub fn new(formatter: &'a dyn Format, diagnostics: &'a mut dyn Write, options: RewriteOptions) -> Self {
        Self {
            formatter,
            diagnostics,
            options,
            state: State::Outside,
            report: FileReport::default(),
        }
    }

    pub fn is_buffering(&self) -> bool {
        matches!(self.state, State::Buffering(_))
    }

    /// Feed one line, terminator included. Output for a block is deferred until it closes.
    pub fn process_line<W: Write + ?Sized>(&mut self, cursor: Cursor<'_>, line: String, out: &mut W) -> Result<()> {
        let fence = fence::classify(&line);
        match std::mem::replace(&mut self.state, State::Outside) {
            State::Outside => {
                if fence == Some(Fence::Open) {
                    self.state = State::Buffering(OpenBlock {
                        start_line: cursor.line,
                        lines: Vec::new(),
                    });
                }
            }
            State::Buffering(block) if fence == Some(Fence::Close) => {
                self.format_block(cursor.path, block, out)?;
            }
            State::Buffering(mut block) => {
                block.lines.push(line);
                self.state = State::Buffering(block);
                return Ok(());
            }
        }
        out.write_all(line.as_bytes())
            .map_err(|e| RewriteError::io(cursor.path, e))
    }

    /// End of the current file. A block still open is dropped with a warning.
    ///
    /// Returns the report for the file and resets it, so the rewriter can carry on with
    /// another file.
    pub fn finish_file(&mut self, path: &Path) -> Result<FileReport> {
        if let State::Buffering(block) = std::mem::replace(&mut self.state, State::Outside) {
            log::debug!(
                "{}:{}: code block still open at end of file, {} line(s) dropped",
                path.display(),
                block.start_line,
                block.lines.len()
            );
            writeln!(
                self.diagnostics,
                "# WARNING: {}:{}: code block still open when file ended, content lost:",
                path.display(),
                block.start_line
            )
            .and_then(|()| self.diagnostics.write_all(block.lines.concat().as_bytes()))
            .map_err(RewriteError::Diagnostics)?;
            self.report.blocks_lost += 1;
        }
        Ok(std::mem::take(&mut self.report))
    }

    fn format_block<W: Write + ?Sized>(&mut self, path: &Path, block: OpenBlock, out: &mut W) -> Result<()> {
        writeln!(self.diagnostics, "# {}:{}", path.display(), block.start_line).map_err(RewriteError::Diagnostics)?;

        let prefix = detect_indent(&block.lines);
        let input = dedent(&block.lines, &prefix).concat();
        let output = self.formatter.format(&input)?;

        if !output.success() {
            if self.options.strict {
                return Err(RewriteError::FormatterFailed {
                    path: path.to_path_buf(),
                    line: block.start_line,
                    exit_code: output.exit_code(),
                });
            }
            log::debug!(
                "{}:{}: formatter exited with code {}, using its output as-is",
                path.display(),
                block.start_line,
                output.exit_code()
            );
        }

        let formatted = indent(&split_lines_keeping_terminators(&output.stdout), &prefix);
        for line in &formatted {
            out.write_all(line.as_bytes()).map_err(|e| RewriteError::io(path, e))?;
        }
        self.report.blocks_formatted += 1;
        Ok(())
    }
}

/// Rewrite a file in place.
///
/// The original is only replaced once every line has been processed; on error it is
/// left as it was.
pub fn rewrite_file(
    path: &Path,
    formatter: &dyn Format,
    diagnostics: &mut dyn Write,
    options: RewriteOptions,
) -> Result<FileReport> {
    let mut file = InPlaceFile::open(path)?;
    let mut rewriter = BlockRewriter::new(formatter, diagnostics, options);
    let mut line_number = 0;
    while let Some(line) = file.next_line()? {
        line_number += 1;
        let cursor = Cursor { path, line: line_number };
        rewriter.process_line(cursor, line, file.output())?;
    }
    let report = rewriter.finish_file(path)?;
    file.commit()?;
    Ok(report)
}

/// Rewrite a document held in memory. `path` only names it in diagnostics.
pub fn rewrite_str(
    text: &str,
    path: &Path,
    formatter: &dyn Format,
    diagnostics: &mut dyn Write,
    options: RewriteOptions,
) -> Result<(String, FileReport)> {
    let mut out = Vec::with_capacity(text.len());
    let mut rewriter = BlockRewriter::new(formatter, diagnostics, options);
    for (index, line) in split_lines_keeping_terminators(text).into_iter().enumerate() {
        let cursor = Cursor { path, line: index + 1 };
        rewriter.process_line(cursor, line, &mut out)?;
    }
    let report = rewriter.finish_file(path)?;
    Ok((String::from_utf8_lossy(&out).into_owned(), report))
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_rewritten: usize,
    pub blocks_formatted: usize,
    pub blocks_lost: usize,
    /// Files left untouched because a block failed in strict mode.
    pub failed_files: Vec<PathBuf>,
}

/// Rewrite every file in order.
///
/// Strict-mode failures skip the file and are recorded in the summary; any other error
/// stops the run immediately.
pub fn rewrite_files<P: AsRef<Path>>(
    paths: &[P],
    formatter: &dyn Format,
    diagnostics: &mut dyn Write,
    options: RewriteOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    for path in paths {
        let path = path.as_ref();
        match rewrite_file(path, formatter, diagnostics, options) {
            Ok(report) => {
                summary.files_rewritten += 1;
                summary.blocks_formatted += report.blocks_formatted;
                summary.blocks_lost += report.blocks_lost;
            }
            Err(e) if !e.is_fatal() => {
                log::error!("{e}; {} left unchanged", path.display());
                summary.failed_files.push(path.to_path_buf());
            }
            Err(e) => return Err(e),
        }
    }
    log::info!(
        "Rewrote {} file(s): {} block(s) formatted, {} lost",
        summary.files_rewritten,
        summary.blocks_formatted,
        summary.blocks_lost
    );
    Ok(summary)
}
