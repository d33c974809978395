//! Patch pipeline: read the request body, run the verification policy, and
//! pipe the bytes into the apply command.
//!
//! The pipeline never schedules a restart itself. The HTTP handler does that
//! after the success response has been written, so the client always sees
//! the outcome of its own request.

mod apply;
mod errors;
mod pipeline;
mod verify;

pub use apply::{ApplyOutput, MailboxApplier, PatchApplier};
pub use errors::{ApplyError, PatchError, VerificationError};
pub use pipeline::{AppliedPatch, Patch, PatchPipeline};
pub use verify::{AcceptAnyPatch, PatchVerifier};

const PATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::patch");
