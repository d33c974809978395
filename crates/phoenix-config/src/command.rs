//! External commands the daemon shells out to.

use std::ffi::OsString;

use camino::Utf8PathBuf;

/// Command that applies a mailbox patch read from standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments passed before the patch is streamed on stdin.
    pub args: Vec<String>,
    /// Working tree the command runs in.
    pub working_dir: Utf8PathBuf,
}

impl ApplyCommand {
    /// Human-readable rendering used in logs and error messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Command that rebuilds and runs the daemon's own source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartCommand {
    /// Program name, looked up on `PATH` unless it contains a separator.
    pub program: String,
    /// Arguments following the program name.
    pub args: Vec<String>,
}

impl RestartCommand {
    /// Builds the argument vector for a re-exec, `argv[0]` included.
    ///
    /// When `forwarded` is non-empty the arguments are appended after `--` so
    /// the relaunched daemon sees the same command line as this one.
    #[must_use]
    pub fn argv<I>(&self, forwarded: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut argv: Vec<OsString> = std::iter::once(OsString::from(&self.program))
            .chain(self.args.iter().map(OsString::from))
            .collect();
        let mut forwarded = forwarded.into_iter().peekable();
        if forwarded.peek().is_some() {
            argv.push(OsString::from("--"));
            argv.extend(forwarded);
        }
        argv
    }
}
