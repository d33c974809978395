//! Lifecycle states and the requests that end the serving phase.

use std::fmt;

/// Coarse server state reported on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// The listener is accepting requests.
    Serving,
    /// A stop has begun; no new requests are taken.
    ShuttingDown,
    /// The listener has stopped.
    Stopped,
    /// The process image is about to be replaced.
    Restarting,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Serving => "serving",
            Self::ShuttingDown => "shutting_down",
            Self::Stopped => "stopped",
            Self::Restarting => "restarting",
        })
    }
}

/// Reason the supervisor leaves the serving phase. Only the first request
/// received is acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownRequest {
    /// A patch landed; stop and relaunch.
    PatchApplied,
    /// A termination signal arrived; stop without relaunching.
    Signal(i32),
    /// Every request source hung up; stop without relaunching.
    Disconnected,
}

impl ShutdownRequest {
    /// Returns `true` when the stop ends in a relaunch.
    #[must_use]
    pub fn restarts(self) -> bool {
        matches!(self, Self::PatchApplied)
    }
}
