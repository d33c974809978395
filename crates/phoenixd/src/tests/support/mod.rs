//! Test harness utilities for the server behavioural suites.

mod config_loader;
mod environment;
mod replacer;
mod reporter;
mod server;
mod shutdown;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use environment::{EXPORTED_PORT, FixedEnvironment};
pub use replacer::{RecordingReplacer, ReplaceCall};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use server::ServerWorld;
pub use shutdown::TestShutdownSignal;
