//! Command-line splitting into formatter options and Markdown files.
//!
//! Grammar: `[--help|-h|-?] [formatter options...] [--] FILE...`. Options are collected
//! while arguments start with `-`; the first `--` (consumed) or the first argument not
//! starting with `-` (kept, as the first file) ends them.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Arguments that request the help text when given first.
pub const HELP_ARGS: &[&str] = &["--help", "-h", "-?"];

/// Environment variable enabling strict mode.
pub const STRICT_ENV: &str = "BLACK_MARKDOWN_STRICT";

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print the help text to stdout and exit successfully.
    Help,
    /// Nothing to do: print usage to stderr and fail.
    MissingArguments,
    Run(RunArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Options forwarded verbatim to the formatter. Empty means "use the defaults".
    pub formatter_options: Vec<OsString>,
    pub files: Vec<PathBuf>,
}

/// Split the arguments that follow the program name.
///
/// Arguments are never decoded, so file names and options that are not valid UTF-8 pass
/// through unchanged.
pub fn split_args<S: AsRef<OsStr>>(args: &[S]) -> Invocation {
    let Some(first) = args.first() else {
        return Invocation::MissingArguments;
    };
    let first = first.as_ref();
    if HELP_ARGS.iter().any(|help| first == OsStr::new(help)) {
        return Invocation::Help;
    }

    let mut formatter_options = Vec::new();
    let mut files = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        if arg == "--" {
            files.extend(args[i + 1..].iter().map(|a| Path::new(a).to_path_buf()));
            break;
        }
        if !arg.as_encoded_bytes().starts_with(b"-") {
            files.extend(args[i..].iter().map(|a| Path::new(a).to_path_buf()));
            break;
        }
        formatter_options.push(arg.to_os_string());
    }

    if files.is_empty() {
        return Invocation::MissingArguments;
    }
    Invocation::Run(RunArgs {
        formatter_options,
        files,
    })
}

/// Interpret the strict-mode switch: unset, empty, `0` and `false` mean off.
pub fn strict_enabled(value: Option<&OsStr>) -> bool {
    match value.map(|v| v.to_string_lossy().trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !(v.is_empty() || v == "0" || v == "false"),
    }
}
