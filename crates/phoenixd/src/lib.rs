//! Runtime for the Phoenix self-updating server.
//!
//! The daemon serves its working directory over HTTP and accepts mailbox
//! patches on `/patch`. A patch is applied to the source tree by the
//! configured version-control tool; once it lands the server stops and the
//! process image is replaced by a fresh invocation of the build/run command,
//! so the patched source takes over on the same port with the same
//! environment.
//!
//! ## Request flow
//!
//! 1. The [`transport`] listener accepts a request and routes it. Every path
//!    other than `/patch` is answered from the static file tree.
//! 2. The [`patch`] pipeline reads the body, runs the verification policy,
//!    and pipes the bytes into the apply command. Failures become a `400`
//!    carrying the error text.
//! 3. After a successful `200 OK` has been written, the handler posts a
//!    shutdown request to the supervisor over a channel.
//! 4. The [`process`] supervisor stops the listener (graceful first, forced
//!    after [`SHUTDOWN_GRACE`]) and hands the restart command to a
//!    [`ProcessReplacer`].
//!
//! Infrastructure failures on the supervisor side (binding, forced close,
//! locating or executing the restart tool) are fatal and surface as a
//! [`LaunchError`].

mod bootstrap;
mod health;
#[cfg(test)]
mod manual;
pub mod patch;
pub mod process;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, ServerContext, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    EnvironmentSource, ExecReplacer, InheritedEnvironment, LaunchError, LifecycleState,
    ProcessReplacer, RestartError, SHUTDOWN_GRACE, ShutdownRequest, StopOutcome, Termination,
    run_server,
};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
