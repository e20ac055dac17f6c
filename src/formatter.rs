//! External formatter invocation.
//!
//! The formatter reads code on stdin and writes the formatted code to stdout. Its
//! stderr is inherited so its own messages reach the operator. There is no timeout:
//! a formatter that never exits blocks the run.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use thiserror::Error;

/// Program run on every code block.
pub const DEFAULT_PROGRAM: &str = "black";

/// Options used when none are given on the command line.
pub const DEFAULT_OPTIONS: &[&str] = &["--quiet"];

/// Argument telling the formatter to read from stdin.
pub const STDIN_ARG: &str = "-";

/// Result of running the formatter on one block.
#[derive(Debug, Clone)]
pub struct FormatterOutput {
    /// Standard output, decoded lossily.
    pub stdout: String,
    /// Exit status of the formatter process.
    pub status: ExitStatus,
}

impl FormatterOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, or -1 when the process was terminated by a signal.
    pub fn exit_code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// Error launching or talking to the formatter.
#[derive(Error, Debug)]
pub enum FormatterError {
    #[error("Formatter '{program}' not found in PATH")]
    NotFound { program: String },

    #[error("Failed to spawn '{program}'")]
    Spawn { program: String, source: io::Error },

    #[error("I/O error while running '{program}': {message}")]
    Io { program: String, message: String },
}

/// Anything able to format the content of one code block.
pub trait Format {
    fn format(&self, input: &str) -> Result<FormatterOutput, FormatterError>;
}

/// Formatter run as a subprocess: `program options... -`.
#[derive(Debug, Clone)]
pub struct FormatterCommand {
    program: String,
    args: Vec<OsString>,
}

impl FormatterCommand {
    /// Create a command for `program`, falling back to [`DEFAULT_OPTIONS`] when `options`
    /// is empty. The stdin argument is appended after the options.
    pub fn new(program: impl Into<String>, options: &[OsString]) -> Self {
        let mut args: Vec<OsString> = if options.is_empty() {
            DEFAULT_OPTIONS.iter().map(OsString::from).collect()
        } else {
            options.to_vec()
        };
        args.push(OsString::from(STDIN_ARG));
        Self {
            program: program.into(),
            args,
        }
    }

    /// The default formatter with the given options.
    pub fn black(options: &[OsString]) -> Self {
        Self::new(DEFAULT_PROGRAM, options)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn io_error(&self, message: String) -> FormatterError {
        FormatterError::Io {
            program: self.program.clone(),
            message,
        }
    }
}

impl Format for FormatterCommand {
    fn format(&self, input: &str) -> Result<FormatterOutput, FormatterError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => FormatterError::NotFound {
                    program: self.program.clone(),
                },
                _ => FormatterError::Spawn {
                    program: self.program.clone(),
                    source: e,
                },
            })?;

        let stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));

        if let Some(mut stdin) = child.stdin.take() {
            // A formatter may exit without draining its input; the exit status and
            // output still tell the story, so a broken pipe is not an error here.
            if let Err(e) = stdin.write_all(input.as_bytes())
                && e.kind() != io::ErrorKind::BrokenPipe
            {
                return Err(self.io_error(format!("Failed to write to stdin: {e}")));
            }
        }

        let status = child
            .wait()
            .map_err(|e| self.io_error(format!("Failed to wait for process: {e}")))?;
        let stdout = join_reader(stdout_handle).map_err(|e| self.io_error(e))?;

        Ok(FormatterOutput { stdout, status })
    }
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn join_reader(handle: Option<thread::JoinHandle<io::Result<String>>>) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to read output: {e}")),
            Err(_) => Err("Output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}
