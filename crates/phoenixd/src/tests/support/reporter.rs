//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use phoenix_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::patch::{AppliedPatch, PatchError};
use crate::process::{LifecycleState, StopOutcome};

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    Listening(SocketAddr),
    PatchAccepted(usize),
    PatchRejected(String),
    StateChanged(LifecycleState),
    ShutdownCompleted(StopOutcome),
    RestartInitiated { program: PathBuf, argv: Vec<OsString> },
}

/// Records health events and wakes waiters on every new one.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
    recorded: Condvar,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
        self.recorded.notify_all();
    }

    /// Waits for the first event `select` maps to a value.
    pub fn wait_for<T>(
        &self,
        timeout: Duration,
        select: impl Fn(&HealthEvent) -> Option<T>,
    ) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock().expect("health reporter mutex poisoned");
        loop {
            if let Some(found) = events.iter().find_map(&select) {
                return Some(found);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            events = self
                .recorded
                .wait_timeout(events, deadline - now)
                .expect("health reporter mutex poisoned")
                .0;
        }
    }

    /// Lifecycle transitions in the order they were reported.
    pub fn states(&self) -> Vec<LifecycleState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listening(&self, address: SocketAddr) {
        self.record(HealthEvent::Listening(address));
    }

    fn patch_accepted(&self, applied: &AppliedPatch) {
        self.record(HealthEvent::PatchAccepted(applied.len()));
    }

    fn patch_rejected(&self, error: &PatchError) {
        self.record(HealthEvent::PatchRejected(error.to_string()));
    }

    fn state_changed(&self, state: LifecycleState) {
        self.record(HealthEvent::StateChanged(state));
    }

    fn shutdown_completed(&self, outcome: StopOutcome) {
        self.record(HealthEvent::ShutdownCompleted(outcome));
    }

    fn restart_initiated(&self, program: &Path, argv: &[OsString]) {
        self.record(HealthEvent::RestartInitiated {
            program: program.to_path_buf(),
            argv: argv.to_vec(),
        });
    }
}
