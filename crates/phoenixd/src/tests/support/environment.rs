//! Environment double standing in for the process environment.

use std::ffi::OsString;

use phoenix_config::PORT_ENV_VAR;

use crate::process::EnvironmentSource;

/// `PORT` value the relaunch is expected to carry.
pub const EXPORTED_PORT: &str = "48151";

/// Fixed variable set handed to the relaunch instead of the real
/// environment, which tests never mutate.
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    vars: Vec<(OsString, OsString)>,
}

impl FixedEnvironment {
    /// `PORT` set to [`EXPORTED_PORT`] alongside an unrelated variable.
    #[must_use]
    pub fn exported() -> Self {
        Self {
            vars: vec![
                (OsString::from(PORT_ENV_VAR), OsString::from(EXPORTED_PORT)),
                (OsString::from("PHOENIX_TEST_MARKER"), OsString::from("kept")),
            ],
        }
    }

    pub fn vars(&self) -> &[(OsString, OsString)] {
        &self.vars
    }
}

impl EnvironmentSource for FixedEnvironment {
    fn snapshot(&self) -> Vec<(OsString, OsString)> {
        self.vars.clone()
    }
}
