//! Process exit codes.
//!
//! A block the formatter rejects leaves the code at [`SUCCESS`] unless strict mode is on;
//! its output is spliced in all the same.

/// All files were rewritten.
pub const SUCCESS: i32 = 0;

/// No file was named on the command line.
pub const USAGE_ERROR: i32 = 1;

/// A file could not be read or replaced, the formatter could not be started, or a block
/// failed in strict mode.
pub const TOOL_ERROR: i32 = 2;

/// Terminate the process with one of the codes above.
pub mod exit {
    use super::{SUCCESS, TOOL_ERROR, USAGE_ERROR};

    pub fn success() -> ! {
        std::process::exit(SUCCESS)
    }

    pub fn usage_error() -> ! {
        std::process::exit(USAGE_ERROR)
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR)
    }
}
