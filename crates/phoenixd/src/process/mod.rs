//! Process supervision: stopping the listener and relaunching the server.

use std::time::Duration;

mod errors;
pub(crate) mod launch;
mod lifecycle;
mod restart;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{Termination, run_server};
pub use lifecycle::{LifecycleState, ShutdownRequest};
pub use restart::{
    EnvironmentSource, ExecReplacer, InheritedEnvironment, ProcessReplacer, RestartError,
    locate_program,
};
pub use shutdown::{
    ShutdownError, ShutdownSequencer, ShutdownSignal, StopOutcome, SystemShutdownSignal,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Time in-flight requests get to finish once a stop begins.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);
