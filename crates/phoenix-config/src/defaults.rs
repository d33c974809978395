//! Built-in defaults shared by the configuration model and its tests.

use crate::logging::LogFormat;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Path, relative to the process working directory, served as static files.
pub const DEFAULT_SERVE_ROOT: &str = ".";

/// Working tree the patch tool runs in.
pub const DEFAULT_REPOSITORY: &str = ".";

/// Version-control binary that applies mailbox patches.
pub const DEFAULT_VCS_PROGRAM: &str = "git";

/// Arguments passed to [`DEFAULT_VCS_PROGRAM`]; the patch arrives on stdin.
pub const DEFAULT_VCS_ARGS: &[&str] = &["am"];

/// Build/run tool re-executed after a patch lands.
pub const DEFAULT_RESTART_PROGRAM: &str = "cargo";

/// Arguments passed to [`DEFAULT_RESTART_PROGRAM`].
pub const DEFAULT_RESTART_ARGS: &[&str] = &["run"];

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default patch tool arguments as owned strings.
#[must_use]
pub fn default_vcs_args() -> Vec<String> {
    DEFAULT_VCS_ARGS.iter().map(|arg| (*arg).to_owned()).collect()
}

/// Default restart arguments as owned strings.
#[must_use]
pub fn default_restart_args() -> Vec<String> {
    DEFAULT_RESTART_ARGS
        .iter()
        .map(|arg| (*arg).to_owned())
        .collect()
}
