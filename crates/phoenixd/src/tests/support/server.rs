//! Runs the full supervisor on a background thread for behavioural tests.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::health::HealthReporter;
use crate::process::LaunchError;
use crate::process::Termination;
use crate::process::launch::{LaunchPlan, ProcessControl, ServiceDeps, run_server_with};

use super::config_loader::TestConfigLoader;
use super::environment::FixedEnvironment;
use super::replacer::RecordingReplacer;
use super::reporter::{HealthEvent, RecordingHealthReporter};
use super::shutdown::TestShutdownSignal;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A supervised server running on its own thread.
pub struct ServerWorld {
    pub loader: TestConfigLoader,
    pub reporter: Arc<RecordingHealthReporter>,
    pub replacer: RecordingReplacer,
    pub shutdown: TestShutdownSignal,
    pub environment: FixedEnvironment,
    forwarded_args: Vec<OsString>,
    handle: Option<thread::JoinHandle<Result<Termination, LaunchError>>>,
    result: Option<Result<Termination, LaunchError>>,
}

impl ServerWorld {
    #[must_use]
    pub fn new(loader: TestConfigLoader) -> Self {
        Self {
            loader,
            reporter: Arc::new(RecordingHealthReporter::default()),
            replacer: RecordingReplacer::default(),
            shutdown: TestShutdownSignal::new(),
            environment: FixedEnvironment::exported(),
            forwarded_args: Vec::new(),
            handle: None,
            result: None,
        }
    }

    /// Arguments passed to this process that the relaunch should forward.
    pub fn forward_args(&mut self, args: &[&str]) {
        self.forwarded_args = args.iter().map(OsString::from).collect();
    }

    /// Starts the supervisor and waits until the listener is bound.
    pub fn start(&mut self) -> SocketAddr {
        let loader = self.loader.clone();
        let reporter = Arc::clone(&self.reporter) as Arc<dyn HealthReporter>;
        let plan = LaunchPlan {
            process: ProcessControl {
                shutdown: self.shutdown.clone(),
                replacer: self.replacer.clone(),
                environment: self.environment.clone(),
                forwarded_args: self.forwarded_args.clone(),
            },
            services: ServiceDeps { loader, reporter },
        };
        self.handle = Some(thread::spawn(move || run_server_with(plan)));
        self.reporter
            .wait_for(STARTUP_TIMEOUT, |event| match event {
                HealthEvent::Listening(addr) => Some(*addr),
                _ => None,
            })
            .expect("server did not report a bound listener")
    }

    /// Waits for the supervisor to return and records its result.
    pub fn join(&mut self) -> &Result<Termination, LaunchError> {
        if let Some(handle) = self.handle.take() {
            let result = handle.join().expect("supervisor thread panicked");
            self.result = Some(result);
        }
        self.result.as_ref().expect("server was never started")
    }

    /// Returns `true` while the supervisor thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ServerWorld {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown.trigger(15);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
        self.shutdown.close();
    }
}
