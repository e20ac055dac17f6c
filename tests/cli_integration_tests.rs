#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Stand-in for black: records its arguments, then fixes a couple of assignments.
const FAKE_BLACK: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$BLACK_ARGS_LOG"
sed -e 's/x=1/x = 1/' -e 's/y=2/y = 2/'
"#;

const FAILING_BLACK: &str = r#"#!/bin/sh
cat > /dev/null
echo "error: cannot format -: Cannot parse" >&2
exit 123
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// A scratch directory with an empty `bin/` that is the only entry on PATH.
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        fs::create_dir(dir.path().join("bin")).expect("Failed to create bin directory");
        Self { dir }
    }

    fn with_black(script: &str) -> Self {
        let fixture = Self::new();
        let black = fixture.bin().join("black");
        fs::write(&black, script).expect("Failed to write fake black");
        fs::set_permissions(&black, fs::Permissions::from_mode(0o755)).expect("Failed to chmod fake black");
        fixture
    }

    fn bin(&self) -> PathBuf {
        self.dir.path().join("bin")
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write document");
        path
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("Failed to read document")
    }

    fn args_log(&self) -> String {
        fs::read_to_string(self.dir.path().join("black-args.log")).unwrap_or_default()
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut path = vec![self.bin()];
        // Keep sh, sed and cat reachable for the fake formatter.
        path.extend(["/usr/bin", "/bin"].map(PathBuf::from));
        let mut cmd = cargo_bin_cmd!("black-markdown");
        cmd.current_dir(self.dir.path())
            .env("PATH", std::env::join_paths(path).expect("valid PATH"))
            .env("BLACK_ARGS_LOG", self.dir.path().join("black-args.log"))
            .env_remove("BLACK_MARKDOWN_STRICT")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Like [`Fixture::cmd`] but with nothing on PATH besides the empty `bin/`.
    fn cmd_without_formatter(&self) -> assert_cmd::Command {
        let mut cmd = self.cmd();
        cmd.env("PATH", self.bin());
        cmd
    }
}

#[test]
#[serial]
fn test_no_arguments_prints_usage_to_stderr() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Usage: black-markdown [--help|-h|-?] [black options] MARKDOWN-FILE...",
        ))
        .stderr(predicate::str::contains("black options default to --quiet."));
}

#[test]
#[serial]
fn test_help_prints_usage_to_stdout() {
    let fixture = Fixture::new();
    for flag in ["--help", "-h", "-?"] {
        fixture
            .cmd()
            .args([flag, "ignored.md"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage: black-markdown"))
            .stdout(predicate::str::contains(
                "black-markdown runs black on Python code blocks in Markdown files.",
            ))
            .stdout(predicate::str::contains("Be sure to have backups"));
    }
}

#[test]
#[serial]
fn test_options_without_files_is_a_usage_error() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture
        .cmd()
        .args(["--fast", "--"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));
    assert_eq!(fixture.args_log(), "");
}

#[test]
#[serial]
fn test_formats_python_blocks_in_place() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture.write(
        "doc.md",
        "# Example\n\n```python\nx=1\n```\n\n- item\n\n  ```python\n  y=2\n  ```\n\n```rust\nlet x=1;\n```\n",
    );

    fixture
        .cmd()
        .arg("doc.md")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("# doc.md:3\n"))
        .stderr(predicate::str::contains("# doc.md:9\n"));

    assert_eq!(
        fixture.read("doc.md"),
        "# Example\n\n```python\nx = 1\n```\n\n- item\n\n  ```python\n  y = 2\n  ```\n\n```rust\nlet x=1;\n```\n"
    );
    assert_eq!(fixture.args_log(), "--quiet\n-\n");
}

#[test]
#[serial]
fn test_forwards_formatter_options() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture.write("doc.md", "```python\nx=1\n```\n");

    fixture
        .cmd()
        .args(["--line-length=100", "--fast", "doc.md"])
        .assert()
        .success();

    assert_eq!(fixture.args_log(), "--line-length=100\n--fast\n-\n");
    assert_eq!(fixture.read("doc.md"), "```python\nx = 1\n```\n");
}

#[test]
#[serial]
fn test_double_dash_ends_options() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture.write("-odd.md", "```python\ny=2\n```\n");

    fixture.cmd().args(["-q", "--", "-odd.md"]).assert().success();

    assert_eq!(fixture.args_log(), "-q\n-\n");
    assert_eq!(fixture.read("-odd.md"), "```python\ny = 2\n```\n");
}

#[test]
#[serial]
fn test_unterminated_block_is_dropped_with_warning() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture.write("a.md", "intro\n```python\nx=1\n");
    fixture.write("b.md", "```\n```python\ny=2\n```\n");

    fixture
        .cmd()
        .args(["a.md", "b.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "# WARNING: a.md:2: code block still open when file ended, content lost:\nx=1\n",
        ))
        .stderr(predicate::str::contains("# b.md:2\n"));

    assert_eq!(fixture.read("a.md"), "intro\n```python\n");
    // The open block from a.md does not carry over: b.md's first fence is plain text.
    assert_eq!(fixture.read("b.md"), "```\n```python\ny = 2\n```\n");
}

#[test]
#[serial]
fn test_missing_formatter_aborts_without_touching_files() {
    let fixture = Fixture::new();
    let text = "```python\nx=1\n```\n";
    fixture.write("doc.md", text);

    fixture
        .cmd_without_formatter()
        .arg("doc.md")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Formatter 'black' not found in PATH"));

    assert_eq!(fixture.read("doc.md"), text);
}

#[test]
#[serial]
fn test_failing_formatter_output_replaces_block() {
    let fixture = Fixture::with_black(FAILING_BLACK);
    fixture.write("doc.md", "before\n```python\nx = (\n```\nafter\n");

    fixture
        .cmd()
        .arg("doc.md")
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot parse"));

    assert_eq!(fixture.read("doc.md"), "before\n```python\n```\nafter\n");
}

#[test]
#[serial]
fn test_strict_mode_leaves_failing_file_untouched() {
    let fixture = Fixture::with_black(FAILING_BLACK);
    let text = "```python\nx = (\n```\n";
    fixture.write("bad.md", text);
    fixture.write("plain.md", "no code here\n");

    fixture
        .cmd()
        .env("BLACK_MARKDOWN_STRICT", "1")
        .args(["bad.md", "plain.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Formatter exited with code 123"));

    assert_eq!(fixture.read("bad.md"), text);
    assert_eq!(fixture.read("plain.md"), "no code here\n");
}

#[test]
#[serial]
fn test_crlf_document_keeps_line_endings() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture.write("doc.md", "Title\r\n```python\r\nx=1\r\n```\r\n");

    fixture.cmd().arg("doc.md").assert().success();

    assert_eq!(fixture.read("doc.md"), "Title\r\n```python\r\nx = 1\r\n```\r\n");
}

#[test]
#[serial]
fn test_missing_file_is_a_tool_error() {
    let fixture = Fixture::with_black(FAKE_BLACK);
    fixture
        .cmd()
        .arg("missing.md")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to access file missing.md: "))
        .stderr(predicate::function(|err: &str| err.matches("os error").count() == 1));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_non_utf8_file_name_is_used_verbatim() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = Fixture::with_black(FAKE_BLACK);
    let name = OsStr::from_bytes(b"caf\xe9.md");
    let path = fixture.dir.path().join(name);
    fs::write(&path, "```python\nx=1\n```\n").expect("Failed to write document");
    fixture.write("next.md", "```python\ny=2\n```\n");

    fixture.cmd().arg(name).arg("next.md").assert().success();

    assert_eq!(fs::read_to_string(&path).unwrap(), "```python\nx = 1\n```\n");
    assert_eq!(fixture.read("next.md"), "```python\ny = 2\n```\n");
}
