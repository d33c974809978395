//! Error types for the patch pipeline.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures surfaced to the client of the patch endpoint.
///
/// The `Display` text is sent verbatim as the body of the `400` response.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The request body could not be read.
    #[error("reading patch: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The verification policy rejected the payload.
    #[error("verifying patch: {source}")]
    Verify {
        /// Policy rejection.
        #[source]
        source: VerificationError,
    },
    /// The apply command failed.
    #[error("applying patch: {source}")]
    Apply {
        /// Underlying apply failure.
        #[source]
        source: ApplyError,
    },
}

/// Rejection reported by a [`crate::patch::PatchVerifier`].
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct VerificationError {
    reason: String,
}

impl VerificationError {
    /// Builds a rejection with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failures raised while running the apply command.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The command could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Streaming the patch in or the output out failed.
    #[error("failed to exchange data with '{command}': {source}")]
    Io {
        /// Rendered command line.
        command: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The command exited unsuccessfully. The working tree is left as the
    /// command left it.
    #[error("'{command}' exited with {status}\n{output}")]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Combined stdout and stderr.
        output: String,
    },
}
