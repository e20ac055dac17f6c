use anyhow::Context;
use black_markdown::exit_codes::exit;
use black_markdown::formatter::{DEFAULT_OPTIONS, DEFAULT_PROGRAM};
use black_markdown::invocation::{self, Invocation, RunArgs, STRICT_ENV};
use black_markdown::{FormatterCommand, RewriteOptions, RunSummary};
use clap::Command;
use colored::*;
use std::ffi::OsString;
use std::io;

const PROGRAM_NAME: &str = "black-markdown";

// argv is split by `invocation::split_args`: clap's escape handling swallows a leading
// `--`, which this grammar needs to see. clap only renders the usage text.
fn command() -> Command {
    let options_note = format!(
        "Options list terminates after \"--\" or at first argument not starting with \"-\".\n\
         {DEFAULT_PROGRAM} options default to {}.",
        DEFAULT_OPTIONS.join(" ")
    );
    let description = format!(
        "{PROGRAM_NAME} runs {DEFAULT_PROGRAM} on Python code blocks in Markdown files.\n\
         Be sure to have backups and inspect results afterwards, as there are no guarantees \
         whatsoever. For example, but certainly not limited to, a block's content is replaced \
         by whatever {DEFAULT_PROGRAM} prints, even if it fails and prints nothing, and a code \
         block left open at the end of a file is dropped.\n\n\
         Set {STRICT_ENV}=1 to leave a file untouched when {DEFAULT_PROGRAM} fails on one of \
         its blocks. Set RUST_LOG=debug for details."
    );
    Command::new(PROGRAM_NAME)
        .override_usage(format!(
            "{PROGRAM_NAME} [--help|-h|-?] [{DEFAULT_PROGRAM} options] MARKDOWN-FILE..."
        ))
        .help_template("{usage-heading} {usage}\n\n{after-help}")
        .after_help(options_note.clone())
        .after_long_help(format!("{options_note}\n\n{description}"))
}

fn run(args: RunArgs) -> anyhow::Result<RunSummary> {
    let formatter = FormatterCommand::black(&args.formatter_options);
    let options = RewriteOptions {
        strict: invocation::strict_enabled(std::env::var_os(STRICT_ENV).as_deref()),
    };
    log::debug!(
        "Running `{} {}` on {} file(s), strict: {}",
        formatter.program(),
        formatter
            .args()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" "),
        args.files.len(),
        options.strict
    );

    let mut diagnostics = io::stderr();
    black_markdown::rewrite_files(&args.files, &formatter, &mut diagnostics, options)
        .with_context(|| format!("Aborted while running {}", formatter.program()))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    match invocation::split_args(&args) {
        Invocation::Help => {
            println!("{}", command().render_long_help().to_string().trim_end());
            exit::success();
        }
        Invocation::MissingArguments => {
            eprintln!("{}", command().render_help().to_string().trim_end());
            exit::usage_error();
        }
        Invocation::Run(run_args) => match run(run_args) {
            Ok(summary) if summary.failed_files.is_empty() => exit::success(),
            // Each failed file was already reported when it was skipped.
            Ok(_) => exit::tool_error(),
            Err(e) => {
                eprintln!("{}: {e:#}", "Error".red().bold());
                exit::tool_error();
            }
        },
    }
}
