//! Test configuration loaders backed by temporary directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use camino::Utf8PathBuf;
use phoenix_config::{Config, ConfigError};
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Script used when a scenario does not care what the patch tool does.
const ACCEPTING_SCRIPT: &str = "cat > received.patch; echo 'Applying: test patch'";

/// Loader that binds an ephemeral loopback port, serves one temporary
/// directory, and applies patches in another with an `sh -c` stub.
#[derive(Clone)]
pub struct TestConfigLoader {
    serve_root: Arc<TempDir>,
    repository: Arc<TempDir>,
    apply_script: String,
    restart_program: String,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            serve_root: Arc::new(TempDir::new().expect("temporary serve root")),
            repository: Arc::new(TempDir::new().expect("temporary repository")),
            apply_script: ACCEPTING_SCRIPT.to_owned(),
            restart_program: "sh".to_owned(),
        }
    }

    /// Replaces the `sh -c` body run as the patch tool.
    #[must_use]
    pub fn with_apply_script(mut self, script: impl Into<String>) -> Self {
        self.apply_script = script.into();
        self
    }

    /// Replaces the program looked up for the relaunch.
    #[must_use]
    pub fn with_restart_program(mut self, program: impl Into<String>) -> Self {
        self.restart_program = program.into();
        self
    }

    pub fn serve_root(&self) -> &Path {
        self.serve_root.path()
    }

    pub fn repository(&self) -> &Path {
        self.repository.path()
    }

    /// Bytes the accepting stub captured, if it ran.
    pub fn received_patch(&self) -> Option<Vec<u8>> {
        fs::read(self.repository().join("received.patch")).ok()
    }

    fn utf8(path: &Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("temporary path was not UTF-8")
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(Config {
            port: "0".to_owned(),
            host: Some("127.0.0.1".to_owned()),
            serve_root: Self::utf8(self.serve_root()),
            repository: Self::utf8(self.repository()),
            vcs_program: "sh".to_owned(),
            vcs_args: vec!["-c".to_owned(), self.apply_script.clone()],
            restart_program: self.restart_program.clone(),
            restart_args: vec!["-c".to_owned(), "exit 0".to_owned()],
            log_filter: "phoenixd=debug".to_owned(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an unknown flag.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_from_iter(["phoenixd", "--port", "8080", "--no-such-flag"])
    }
}
