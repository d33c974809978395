//! Defines the unified error surface for server launch and supervision.
//!
//! Every variant is fatal: the binary logs it and exits unsuccessfully.

use thiserror::Error;

use phoenix_config::ConfigError;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::restart::RestartError;
use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the server process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load. Also carries `--help` and `--version`
    /// output, which is not a failure.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Bootstrapping the server failed after configuration loaded.
    #[error("server bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Binding or starting the HTTP listener failed.
    #[error("failed to run server: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// The listener could not be forced closed after the grace period.
    #[error("failed to stop server forcefully: {source}")]
    ForceClose {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Signal handlers could not be installed.
    #[error("failed to shut down server: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The restart program could not be located.
    #[error("failed to restart: {source}")]
    RestartLookup {
        /// Underlying lookup error.
        #[source]
        source: RestartError,
    },
    /// Replacing the process image failed.
    #[error("failed to restart: {source}")]
    RestartExec {
        /// Underlying exec error.
        #[source]
        source: RestartError,
    },
}

impl LaunchError {
    /// Returns `true` for `--help` and `--version` requests.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Config { source } if source.is_informational())
    }
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        match source {
            BootstrapError::Configuration { source } => Self::Config { source },
            other => Self::Bootstrap { source: other },
        }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        match source {
            ShutdownError::ForceClose { source } => Self::ForceClose { source },
            other => Self::Shutdown { source: other },
        }
    }
}
