//! Error types for HTTP listener operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen address could not be resolved.
    #[error("failed to resolve TCP address {address}: {source}")]
    Resolve {
        /// Address as configured.
        address: String,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but yielded no addresses.
    #[error("no TCP addresses resolved for {address}")]
    ResolveEmpty {
        /// Address as configured.
        address: String,
    },
    /// The socket could not be bound.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Resolved socket address.
        addr: SocketAddr,
        /// Underlying bind error.
        #[source]
        source: io::Error,
    },
    /// The bound socket could not be inspected.
    #[error("failed to read listener address: {source}")]
    LocalAddr {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// The HTTP server could not take over the bound socket.
    #[error("failed to start HTTP server: {source}")]
    Server {
        /// Underlying server error.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}
