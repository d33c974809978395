//! Shutdown signalling and the graceful-then-forced stop sequence.

use std::io;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{info, warn};

use crate::transport::{ListenerError, ListenerHandle};

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until a termination signal arrives and returns its number.
    /// `None` means the source closed without delivering one.
    fn wait(&self) -> Result<Option<i32>, ShutdownError>;
}

/// Errors reported while stopping the server.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Forcing the listener closed failed.
    #[error("failed to stop server forcefully: {source}")]
    ForceClose {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

/// Shutdown listener for SIGTERM, SIGINT, SIGQUIT, and SIGHUP.
///
/// Handlers are installed at construction so failures surface before the
/// server starts serving.
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
}

impl SystemShutdownSignal {
    /// Installs the signal handlers.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals: Mutex::new(signals),
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<Option<i32>, ShutdownError> {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let received = signals.forever().next();
        if let Some(signal) = received {
            info!(
                target: PROCESS_TARGET,
                signal,
                "shutdown signal received"
            );
        }
        Ok(received)
    }
}

/// How the listener came to a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Every in-flight request finished within the grace period.
    Graceful,
    /// The grace period elapsed and the listener was closed regardless.
    Forced {
        /// Requests still running when the listener was closed.
        abandoned: usize,
    },
}

/// Stops a listener: graceful first, forced once the grace period elapses.
#[derive(Debug, Clone, Copy)]
pub struct ShutdownSequencer {
    grace: Duration,
}

impl ShutdownSequencer {
    /// Builds a sequencer with the given grace period.
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Runs the stop sequence to completion.
    ///
    /// A listener that fails to stop cleanly is closed forcefully like one
    /// that outlives the grace period; only a failed forced close is an
    /// error.
    pub fn stop(&self, mut handle: ListenerHandle) -> Result<StopOutcome, ShutdownError> {
        let deadline = Instant::now() + self.grace;
        info!(
            target: PROCESS_TARGET,
            grace_ms = self.grace.as_millis(),
            in_flight = handle.in_flight(),
            "stopping server"
        );
        match handle.stop_accepting() {
            Ok(()) if handle.wait_idle(deadline) => return Ok(StopOutcome::Graceful),
            Ok(()) => warn!(
                target: PROCESS_TARGET,
                in_flight = handle.in_flight(),
                "failed to shut down gracefully; stopping server forcefully"
            ),
            Err(error) => warn!(
                target: PROCESS_TARGET,
                error = %error,
                "graceful stop failed; stopping server forcefully"
            ),
        }

        let abandoned = handle
            .force_close()
            .map_err(|source| ShutdownError::ForceClose { source })?;
        Ok(StopOutcome::Forced { abandoned })
    }
}

impl Default for ShutdownSequencer {
    fn default() -> Self {
        Self::new(super::SHUTDOWN_GRACE)
    }
}
