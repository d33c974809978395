//! Structured health reporting for server lifecycle events.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use phoenix_config::Config;

use crate::bootstrap::BootstrapError;
use crate::patch::{AppliedPatch, PatchError};
use crate::process::{LifecycleState, StopOutcome};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the HTTP listener is bound.
    fn listening(&self, address: SocketAddr);

    /// Invoked after a patch has been applied to the working tree.
    fn patch_accepted(&self, applied: &AppliedPatch);

    /// Invoked when a patch request fails.
    fn patch_rejected(&self, error: &PatchError);

    /// Invoked on every lifecycle transition.
    fn state_changed(&self, state: LifecycleState);

    /// Invoked after the listener has stopped.
    fn shutdown_completed(&self, outcome: StopOutcome);

    /// Invoked immediately before the process image is replaced.
    fn restart_initiated(&self, program: &Path, argv: &[OsString]);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listening(&self, address: SocketAddr) {
        (**self).listening(address);
    }

    fn patch_accepted(&self, applied: &AppliedPatch) {
        (**self).patch_accepted(applied);
    }

    fn patch_rejected(&self, error: &PatchError) {
        (**self).patch_rejected(error);
    }

    fn state_changed(&self, state: LifecycleState) {
        (**self).state_changed(state);
    }

    fn shutdown_completed(&self, outcome: StopOutcome) {
        (**self).shutdown_completed(outcome);
    }

    fn restart_initiated(&self, program: &Path, argv: &[OsString]) {
        (**self).restart_initiated(program, argv);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting server"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen_address(),
            serve_root = %config.serve_root(),
            apply = %config.apply_command().display_name(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "server bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "server bootstrap failed"
        );
    }

    fn listening(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listening",
            %address,
            "http listener bound"
        );
    }

    fn patch_accepted(&self, applied: &AppliedPatch) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "patch_accepted",
            bytes = applied.len(),
            "patch applied"
        );
    }

    fn patch_rejected(&self, error: &PatchError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "patch_rejected",
            error = %error,
            "failed trying patch"
        );
    }

    fn state_changed(&self, state: LifecycleState) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "state_changed",
            %state,
            "lifecycle transition"
        );
    }

    fn shutdown_completed(&self, outcome: StopOutcome) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            ?outcome,
            "server stopped"
        );
    }

    fn restart_initiated(&self, program: &Path, argv: &[OsString]) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "restart_initiated",
            program = %program.display(),
            ?argv,
            "replacing process image"
        );
    }
}
