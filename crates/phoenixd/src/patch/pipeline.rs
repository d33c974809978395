//! Read, verify, and apply stages of a patch request.

use std::io::{self, Read};

use super::apply::{ApplyOutput, PatchApplier};
use super::errors::PatchError;
use super::verify::PatchVerifier;

/// Raw patch payload as received on the wire.
///
/// No shape is assumed: the bytes are handed to the apply command exactly as
/// they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch(Vec<u8>);

impl Patch {
    /// Wraps payload bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Reads a payload until end of stream.
    pub fn read_from(reader: &mut dyn Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for an empty body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    bytes: usize,
    output: ApplyOutput,
}

impl AppliedPatch {
    /// Size of the applied payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes
    }

    /// Returns `true` when the applied payload was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }

    /// Output captured from the apply command.
    #[must_use]
    pub fn output(&self) -> &ApplyOutput {
        &self.output
    }
}

/// Chains the verification policy and the applier.
pub struct PatchPipeline {
    verifier: Box<dyn PatchVerifier>,
    applier: Box<dyn PatchApplier>,
}

impl PatchPipeline {
    /// Builds a pipeline from its two stages.
    #[must_use]
    pub fn new(verifier: Box<dyn PatchVerifier>, applier: Box<dyn PatchApplier>) -> Self {
        Self { verifier, applier }
    }

    /// Returns `true` when the verification stage admits everything.
    #[must_use]
    pub fn is_unverified(&self) -> bool {
        self.verifier.is_permissive()
    }

    /// Runs every stage against the request body.
    pub fn run(&self, body: &mut dyn Read) -> Result<AppliedPatch, PatchError> {
        let patch = Patch::read_from(body).map_err(|source| PatchError::Read { source })?;
        self.verifier
            .verify(&patch)
            .map_err(|source| PatchError::Verify { source })?;
        let output = self
            .applier
            .apply(&patch)
            .map_err(|source| PatchError::Apply { source })?;
        Ok(AppliedPatch {
            bytes: patch.len(),
            output,
        })
    }
}
