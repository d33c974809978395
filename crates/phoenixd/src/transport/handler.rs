//! Request handling seam between the listener and routing.

use std::io::Read;

use tiny_http::{Header, Request, Response, ResponseBox};
use tracing::warn;

use super::LISTENER_TARGET;

/// Handles requests accepted by the HTTP listener.
pub trait RequestHandler: Send + Sync + 'static {
    /// Handles a single request and responds to it. Implementations should
    /// avoid panicking.
    fn handle(&self, request: Request);
}

/// Writes a response, logging delivery failures. Returns `true` when the
/// response reached the socket.
pub(crate) fn send(request: Request, response: ResponseBox) -> bool {
    let url = request.url().to_owned();
    match request.respond(response) {
        Ok(()) => true,
        Err(error) => {
            warn!(
                target: LISTENER_TARGET,
                %url,
                error = %error,
                "failed to write response"
            );
            false
        }
    }
}

/// Plain-text response with a trailing newline, as error pages are rendered.
pub(crate) fn text_response(status: u16, body: &str) -> ResponseBox {
    let response = Response::from_data(format!("{body}\n").into_bytes()).with_status_code(status);
    let response = with_header(response, "Content-Type", "text/plain; charset=utf-8");
    with_header(response, "X-Content-Type-Options", "nosniff").boxed()
}

/// Adds a header whose name and value are known to be valid ASCII.
pub(crate) fn with_header<R: Read>(response: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => {
            warn!(target: LISTENER_TARGET, name, value, "dropping invalid response header");
            response
        }
    }
}
