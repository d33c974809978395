//! Shared configuration for the Phoenix self-updating server.
//!
//! Settings resolve from the command line first, then the environment, then
//! the built-in defaults. The listening port is read from the unprefixed
//! `PORT` variable because the restart sequence relies on the relaunched
//! process inheriting it untouched; every other knob uses the `PHOENIX_`
//! prefix.

mod command;
mod defaults;
mod listen;
mod logging;

use std::ffi::OsString;
use std::io;

use camino::Utf8PathBuf;
use clap::Parser;
use clap::error::ErrorKind;
use thiserror::Error;

pub use command::{ApplyCommand, RestartCommand};
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_REPOSITORY, DEFAULT_RESTART_ARGS, DEFAULT_RESTART_PROGRAM,
    DEFAULT_SERVE_ROOT, DEFAULT_VCS_ARGS, DEFAULT_VCS_PROGRAM, default_log_filter,
    default_log_format, default_restart_args, default_vcs_args,
};
pub use listen::{ListenAddress, UNSPECIFIED_HOST};
pub use logging::LogFormat;

/// Name of the environment variable carrying the listening port.
pub const PORT_ENV_VAR: &str = "PORT";

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "phoenixd",
    version,
    about = "Serves a directory over HTTP and rebuilds itself from patches posted to /patch"
)]
pub struct Config {
    /// TCP port the HTTP server binds.
    #[arg(long, env = "PORT")]
    pub port: String,

    /// Host the HTTP server binds; every interface when unset.
    #[arg(long, env = "PHOENIX_HOST")]
    pub host: Option<String>,

    /// Directory served for every path other than `/patch`.
    #[arg(long, env = "PHOENIX_SERVE_ROOT", default_value = DEFAULT_SERVE_ROOT)]
    pub serve_root: Utf8PathBuf,

    /// Working tree the patch tool runs in.
    #[arg(long, env = "PHOENIX_REPOSITORY", default_value = DEFAULT_REPOSITORY)]
    pub repository: Utf8PathBuf,

    /// Version-control program that applies mailbox patches from stdin.
    #[arg(long, env = "PHOENIX_VCS_PROGRAM", default_value = DEFAULT_VCS_PROGRAM)]
    pub vcs_program: String,

    /// Arguments for the version-control program.
    #[arg(
        long = "vcs-arg",
        env = "PHOENIX_VCS_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = default_vcs_args()
    )]
    pub vcs_args: Vec<String>,

    /// Build/run tool re-executed once a patch has been applied.
    #[arg(long, env = "PHOENIX_RESTART_PROGRAM", default_value = DEFAULT_RESTART_PROGRAM)]
    pub restart_program: String,

    /// Arguments for the build/run tool.
    #[arg(
        long = "restart-arg",
        env = "PHOENIX_RESTART_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_values_t = default_restart_args()
    )]
    pub restart_args: Vec<String>,

    /// Tracing filter expression.
    #[arg(long, env = "PHOENIX_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format: `compact` or `json`.
    #[arg(long, env = "PHOENIX_LOG_FORMAT", default_value_t = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: String::new(),
            host: None,
            serve_root: Utf8PathBuf::from(DEFAULT_SERVE_ROOT),
            repository: Utf8PathBuf::from(DEFAULT_REPOSITORY),
            vcs_program: DEFAULT_VCS_PROGRAM.to_owned(),
            vcs_args: default_vcs_args(),
            restart_program: DEFAULT_RESTART_PROGRAM.to_owned(),
            restart_args: default_restart_args(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::try_parse().map_err(ConfigError::from)
    }

    /// Loads configuration from an explicit argument iterator.
    ///
    /// The first item is treated as the binary name, matching `std::env::args_os`.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(ConfigError::from)
    }

    /// Address the HTTP listener binds.
    #[must_use]
    pub fn listen_address(&self) -> ListenAddress {
        ListenAddress::new(self.host.clone().unwrap_or_default(), self.port.clone())
    }

    /// Directory served as static files.
    #[must_use]
    pub fn serve_root(&self) -> &Utf8PathBuf {
        &self.serve_root
    }

    /// Command used to apply incoming patches.
    #[must_use]
    pub fn apply_command(&self) -> ApplyCommand {
        ApplyCommand {
            program: self.vcs_program.clone(),
            args: self.vcs_args.clone(),
            working_dir: self.repository.clone(),
        }
    }

    /// Command re-executed after a successful patch.
    #[must_use]
    pub fn restart_command(&self) -> RestartCommand {
        RestartCommand {
            program: self.restart_program.clone(),
            args: self.restart_args.clone(),
        }
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConfigError(#[from] clap::Error);

impl ConfigError {
    /// Returns `true` for `--help` and `--version` requests, which are not failures.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(
            self.0.kind(),
            ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        )
    }

    /// Writes the formatted message to the stream clap selects for its kind.
    pub fn print(&self) -> io::Result<()> {
        self.0.print()
    }
}
