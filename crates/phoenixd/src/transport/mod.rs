//! HTTP transport: the listener, request routing, and static file serving.

mod errors;
mod handler;
mod listener;
mod routes;
mod static_files;

#[cfg(test)]
pub(crate) mod test_utils;

pub use errors::ListenerError;
pub use handler::RequestHandler;
pub use listener::{HttpListener, ListenerHandle};
pub use routes::{AppHandler, PATCH_PATH};
pub use static_files::StaticFiles;

pub(crate) use handler::{send, text_response, with_header};

pub(crate) const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
