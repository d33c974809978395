//! Verification policies applied before a patch reaches the working tree.

use super::errors::VerificationError;
use super::pipeline::Patch;

/// Decides whether a payload may be handed to the apply command.
pub trait PatchVerifier: Send + Sync {
    /// Accepts or rejects the payload.
    fn verify(&self, patch: &Patch) -> Result<(), VerificationError>;

    /// Returns `true` when the policy admits every payload unchecked.
    fn is_permissive(&self) -> bool {
        false
    }
}

/// Policy that admits every payload: empty bodies, binary data, and
/// well-formed mailbox patches alike.
///
/// Anyone who can reach `/patch` can change the source tree and therefore
/// the code the relaunched process runs. Deployments that need more must
/// supply their own [`PatchVerifier`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnyPatch;

impl PatchVerifier for AcceptAnyPatch {
    fn verify(&self, _patch: &Patch) -> Result<(), VerificationError> {
        Ok(())
    }

    fn is_permissive(&self) -> bool {
        true
    }
}
