//! Runs the configured apply command with the patch on standard input.

use std::io::{self, Read, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::thread;

use tracing::{debug, info, warn};

use phoenix_config::ApplyCommand;

use super::PATCH_TARGET;
use super::errors::ApplyError;
use super::pipeline::Patch;

/// Applies a patch to the working tree.
pub trait PatchApplier: Send + Sync {
    /// Applies the patch, returning the tool's combined output.
    fn apply(&self, patch: &Patch) -> Result<ApplyOutput, ApplyError>;
}

/// Combined stdout and stderr of a successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutput {
    text: String,
}

impl ApplyOutput {
    /// Wraps captured output.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Raw captured text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Non-empty output lines in emission order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().filter(|line| !line.trim().is_empty())
    }
}

/// Applier that pipes the patch into a mailbox tool such as `git am`.
#[derive(Debug, Clone)]
pub struct MailboxApplier {
    command: ApplyCommand,
}

impl MailboxApplier {
    /// Builds an applier for the given command.
    #[must_use]
    pub fn new(command: ApplyCommand) -> Self {
        Self { command }
    }

    fn io_error(&self, source: io::Error) -> ApplyError {
        ApplyError::Io {
            command: self.command.display_name(),
            source,
        }
    }
}

impl PatchApplier for MailboxApplier {
    fn apply(&self, patch: &Patch) -> Result<ApplyOutput, ApplyError> {
        let name = self.command.display_name();
        let (mut reader, writer) = io::pipe().map_err(|source| self.io_error(source))?;
        let stderr_writer = writer.try_clone().map_err(|source| self.io_error(source))?;

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .current_dir(self.command.working_dir.as_std_path())
            .stdin(Stdio::piped())
            .stdout(writer)
            .stderr(stderr_writer);

        debug!(
            target: PATCH_TARGET,
            command = %name,
            working_dir = %self.command.working_dir,
            bytes = patch.len(),
            "spawning apply command"
        );
        let mut child = command.spawn().map_err(|source| ApplyError::Spawn {
            command: name.clone(),
            source,
        })?;
        // The parent's copies of the pipe writer live in `command`; EOF only
        // arrives once they are closed.
        drop(command);

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.io_error(io::Error::other("child stdin was not captured")))?;
        let bytes = patch.as_bytes().to_vec();
        let feeder = thread::spawn(move || feed_stdin(stdin, &bytes));

        let mut captured = Vec::new();
        let read = reader.read_to_end(&mut captured);
        let status = child.wait().map_err(|source| self.io_error(source))?;
        read.map_err(|source| self.io_error(source))?;
        feeder
            .join()
            .map_err(|_| self.io_error(io::Error::other("stdin writer panicked")))?
            .map_err(|source| self.io_error(source))?;

        let output = String::from_utf8_lossy(&captured).into_owned();
        if status.success() {
            for line in output.lines().filter(|line| !line.trim().is_empty()) {
                info!(target: PATCH_TARGET, "{name}: {line}");
            }
            Ok(ApplyOutput::new(output))
        } else {
            for line in output.lines().filter(|line| !line.trim().is_empty()) {
                warn!(target: PATCH_TARGET, "{name}: {line}");
            }
            Err(ApplyError::Failed {
                command: name,
                status,
                output,
            })
        }
    }
}

/// Writes the whole patch and closes stdin. A tool that exits without
/// draining its input is not an error here; its exit status decides.
fn feed_stdin(mut stdin: ChildStdin, bytes: &[u8]) -> io::Result<()> {
    match stdin.write_all(bytes) {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
