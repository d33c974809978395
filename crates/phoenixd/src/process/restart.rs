//! Replaces the running process image with the restart command.

use std::env;
use std::ffi::{CString, NulError, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::unistd::execve;
use thiserror::Error;

/// Errors raised while relaunching the server.
#[derive(Debug, Error)]
pub enum RestartError {
    /// The restart program was not found on `PATH`.
    #[error("finding {program} executable: not found in PATH")]
    NotFound {
        /// Program name as configured.
        program: String,
    },
    /// An explicit program path is not an executable file.
    #[error("finding {program} executable: {} is not an executable file", path.display())]
    NotExecutable {
        /// Program name as configured.
        program: String,
        /// Path that was inspected.
        path: PathBuf,
    },
    /// An argument or environment entry contained a NUL byte.
    #[error("restart argument {value:?} contains a NUL byte")]
    InvalidArgument {
        /// Offending value.
        value: OsString,
        /// Underlying conversion error.
        #[source]
        source: NulError,
    },
    /// `execve` returned.
    #[error("calling exec '{command}': {source}")]
    Exec {
        /// Rendered command line.
        command: String,
        /// Errno reported by the kernel.
        #[source]
        source: Errno,
    },
}

/// Capability to replace the running process image.
pub trait ProcessReplacer: Send + Sync {
    /// Replaces the process with `program`. Production implementations only
    /// return on failure.
    fn replace(
        &self,
        program: &Path,
        argv: &[OsString],
        env: &[(OsString, OsString)],
    ) -> Result<(), RestartError>;
}

/// Supplies the variables handed to the relaunched process.
pub trait EnvironmentSource: Send + Sync {
    /// Variables as `(name, value)` pairs, read when the relaunch starts.
    fn snapshot(&self) -> Vec<(OsString, OsString)>;
}

/// This process's own environment, passed through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct InheritedEnvironment;

impl EnvironmentSource for InheritedEnvironment {
    fn snapshot(&self) -> Vec<(OsString, OsString)> {
        env::vars_os().collect()
    }
}

/// Replacer backed by `execve(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecReplacer;

impl ProcessReplacer for ExecReplacer {
    fn replace(
        &self,
        program: &Path,
        argv: &[OsString],
        env: &[(OsString, OsString)],
    ) -> Result<(), RestartError> {
        let path = c_string(program.as_os_str())?;
        let args = argv
            .iter()
            .map(|arg| c_string(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let vars = env
            .iter()
            .map(|(key, value)| {
                let mut entry = key.clone();
                entry.push("=");
                entry.push(value);
                c_string(&entry)
            })
            .collect::<Result<Vec<_>, _>>()?;

        match execve(&path, &args, &vars) {
            Ok(never) => match never {},
            Err(source) => Err(RestartError::Exec {
                command: render(argv),
                source,
            }),
        }
    }
}

/// Resolves `program` the way a shell would: names containing a path
/// separator are used as given, anything else is searched on `PATH`.
pub fn locate_program(program: &str) -> Result<PathBuf, RestartError> {
    locate_in(program, env::var_os("PATH").as_deref())
}

fn locate_in(program: &str, search_path: Option<&OsStr>) -> Result<PathBuf, RestartError> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return if is_executable(&path) {
            Ok(path)
        } else {
            Err(RestartError::NotExecutable {
                program: program.to_owned(),
                path,
            })
        };
    }

    search_path
        .into_iter()
        .flat_map(env::split_paths)
        // Empty entries mean the current directory; relative results are refused.
        .filter(|dir| dir.is_absolute())
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| RestartError::NotFound {
            program: program.to_owned(),
        })
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
}

fn c_string(value: &OsStr) -> Result<CString, RestartError> {
    CString::new(value.as_bytes()).map_err(|source| RestartError::InvalidArgument {
        value: value.to_owned(),
        source,
    })
}

fn render(argv: &[OsString]) -> String {
    argv.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
