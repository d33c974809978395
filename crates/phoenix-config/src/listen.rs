use std::fmt;

/// Host the listener binds when no host is configured.
pub const UNSPECIFIED_HOST: &str = "0.0.0.0";

/// TCP address the HTTP server listens on.
///
/// The port is carried verbatim from configuration. It is not validated here:
/// an empty or non-numeric value surfaces as a resolve failure when the
/// listener binds, mirroring a malformed `:PORT` listen address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenAddress {
    host: String,
    port: String,
}

impl ListenAddress {
    /// Builds a listen address from raw host and port text.
    #[must_use]
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// Host to bind; empty text selects every interface.
    #[must_use]
    pub fn host(&self) -> &str {
        if self.host.is_empty() {
            UNSPECIFIED_HOST
        } else {
            &self.host
        }
    }

    /// Raw port text.
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.host(), self.port)
    }
}
