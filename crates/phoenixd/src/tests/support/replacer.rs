//! Process replacer double that records relaunch requests instead of
//! executing them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use nix::errno::Errno;

use crate::process::{ProcessReplacer, RestartError};

/// One recorded call to [`ProcessReplacer::replace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceCall {
    pub program: PathBuf,
    pub argv: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
}

impl ReplaceCall {
    /// Value of `key` in the environment handed to the new image.
    pub fn env_var(&self, key: &str) -> Option<&OsString> {
        self.env
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

#[derive(Clone, Default)]
pub struct RecordingReplacer {
    calls: Arc<Mutex<Vec<ReplaceCall>>>,
    fail: bool,
}

impl RecordingReplacer {
    /// Replacer whose every call fails as a missing binary would.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ReplaceCall> {
        self.calls.lock().expect("replacer mutex poisoned").clone()
    }
}

impl ProcessReplacer for RecordingReplacer {
    fn replace(
        &self,
        program: &Path,
        argv: &[OsString],
        env: &[(OsString, OsString)],
    ) -> Result<(), RestartError> {
        self.calls
            .lock()
            .expect("replacer mutex poisoned")
            .push(ReplaceCall {
                program: program.to_path_buf(),
                argv: argv.to_vec(),
                env: env.to_vec(),
            });
        if self.fail {
            return Err(RestartError::Exec {
                command: "recording replacer".to_owned(),
                source: Errno::ENOENT,
            });
        }
        Ok(())
    }
}
