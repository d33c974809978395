//! Supervises server launch, the serving phase, and the relaunch.

use std::env;
use std::ffi::OsString;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, info, warn};

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::patch::{AcceptAnyPatch, MailboxApplier, PatchPipeline};
use crate::transport::{AppHandler, HttpListener, StaticFiles};

use super::errors::LaunchError;
use super::lifecycle::{LifecycleState, ShutdownRequest};
use super::restart::{EnvironmentSource, InheritedEnvironment, ProcessReplacer, locate_program};
use super::shutdown::{ShutdownSequencer, ShutdownSignal, SystemShutdownSignal};
use super::{ExecReplacer, PROCESS_TARGET, SHUTDOWN_GRACE};

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The server stopped without relaunching.
    Stopped,
    /// The replacer returned after a relaunch. Only observable with a
    /// replacer that does not exec.
    Replaced,
}

/// Process-level collaborators that end or replace the process.
pub(crate) struct ProcessControl<S, R, E> {
    pub(crate) shutdown: S,
    pub(crate) replacer: R,
    pub(crate) environment: E,
    pub(crate) forwarded_args: Vec<OsString>,
}

/// Service dependencies required to construct the server runtime.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to launch the server runtime.
pub(crate) struct LaunchPlan<L, S, R, E> {
    pub(crate) process: ProcessControl<S, R, E>,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the server using the production collaborators.
pub fn run_server() -> Result<Termination, LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            shutdown: SystemShutdownSignal::install()?,
            replacer: ExecReplacer,
            environment: InheritedEnvironment,
            forwarded_args: env::args_os().skip(1).collect(),
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    };
    run_server_with(plan)
}

/// Runs the server with injected collaborators.
pub(crate) fn run_server_with<L, S, R, E>(
    plan: LaunchPlan<L, S, R, E>,
) -> Result<Termination, LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal + 'static,
    R: ProcessReplacer,
    E: EnvironmentSource,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl {
        shutdown,
        replacer,
        environment,
        forwarded_args,
    } = process;
    let ServiceDeps { loader, reporter } = services;

    let context = bootstrap_with(&loader, reporter)?;
    let config = context.config();
    let reporter = context.reporter();

    let listener = HttpListener::bind(&config.listen_address())?;
    reporter.listening(listener.local_addr());

    let pipeline = PatchPipeline::new(
        Box::new(AcceptAnyPatch),
        Box::new(MailboxApplier::new(config.apply_command())),
    );
    if pipeline.is_unverified() {
        warn!(
            target: PROCESS_TARGET,
            "patch verification is disabled; any client that reaches /patch can change the source tree"
        );
    }

    let (requests, received) = mpsc::channel();
    let handler = Arc::new(AppHandler::new(
        pipeline,
        StaticFiles::new(config.serve_root().clone()),
        requests.clone(),
        Arc::clone(&reporter),
    ));
    let handle = listener.start(handler)?;
    reporter.state_changed(LifecycleState::Serving);
    forward_signals(shutdown, requests);

    let request = received.recv().unwrap_or(ShutdownRequest::Disconnected);
    info!(
        target: PROCESS_TARGET,
        ?request,
        "leaving serving phase"
    );
    drop(received);

    reporter.state_changed(LifecycleState::ShuttingDown);
    let outcome = ShutdownSequencer::new(SHUTDOWN_GRACE).stop(handle)?;
    reporter.shutdown_completed(outcome);
    reporter.state_changed(LifecycleState::Stopped);

    if !request.restarts() {
        info!(target: PROCESS_TARGET, "shutdown sequence completed");
        return Ok(Termination::Stopped);
    }

    reporter.state_changed(LifecycleState::Restarting);
    let command = config.restart_command();
    let program = locate_program(&command.program)
        .map_err(|source| LaunchError::RestartLookup { source })?;
    let argv = command.argv(forwarded_args);
    let variables = environment.snapshot();
    reporter.restart_initiated(&program, &argv);
    replacer
        .replace(&program, &argv, &variables)
        .map_err(|source| LaunchError::RestartExec { source })?;
    Ok(Termination::Replaced)
}

/// Relays the first termination signal to the supervisor.
fn forward_signals<S>(shutdown: S, requests: Sender<ShutdownRequest>)
where
    S: ShutdownSignal + 'static,
{
    thread::spawn(move || match shutdown.wait() {
        Ok(Some(signal)) => {
            if requests.send(ShutdownRequest::Signal(signal)).is_err() {
                debug!(
                    target: PROCESS_TARGET,
                    signal,
                    "supervisor already stopping; signal ignored"
                );
            }
        }
        Ok(None) => {}
        Err(error) => warn!(
            target: PROCESS_TARGET,
            error = %error,
            "shutdown signal listener failed"
        ),
    });
}
