//! Routes requests to the patch endpoint or the static file tree.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use percent_encoding::percent_decode_str;
use tiny_http::Request;
use tracing::{debug, info, warn};

use crate::health::HealthReporter;
use crate::patch::PatchPipeline;
use crate::process::ShutdownRequest;

use super::{LISTENER_TARGET, RequestHandler, StaticFiles, send, text_response};

/// Path of the patch endpoint. Matched exactly, for any method, against the
/// decoded and cleaned request path; the query string is ignored.
pub const PATCH_PATH: &str = "/patch";

/// Application request handler.
pub struct AppHandler {
    pipeline: PatchPipeline,
    files: StaticFiles,
    shutdown: Sender<ShutdownRequest>,
    reporter: Arc<dyn HealthReporter>,
}

impl AppHandler {
    /// Builds the handler. A successful patch posts one
    /// [`ShutdownRequest::PatchApplied`] on `shutdown`.
    #[must_use]
    pub fn new(
        pipeline: PatchPipeline,
        files: StaticFiles,
        shutdown: Sender<ShutdownRequest>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            pipeline,
            files,
            shutdown,
            reporter,
        }
    }

    fn handle_patch(&self, mut request: Request) {
        let outcome = self.pipeline.run(request.as_reader());
        match outcome {
            Ok(applied) => {
                self.reporter.patch_accepted(&applied);
                if !send(request, text_response(200, "OK")) {
                    warn!(
                        target: LISTENER_TARGET,
                        "patch applied but the client missed the response"
                    );
                }
                info!(target: LISTENER_TARGET, "requesting restart after patch");
                if self.shutdown.send(ShutdownRequest::PatchApplied).is_err() {
                    debug!(
                        target: LISTENER_TARGET,
                        "supervisor already stopped; restart request dropped"
                    );
                }
            }
            Err(error) => {
                self.reporter.patch_rejected(&error);
                send(request, text_response(400, &error.to_string()));
            }
        }
    }
}

impl RequestHandler for AppHandler {
    fn handle(&self, request: Request) {
        if route_path(request.url()) == PATCH_PATH {
            self.handle_patch(request);
        } else {
            self.files.serve(request);
        }
    }
}

/// Decodes the path and resolves empty, `.` and `..` segments. A trailing
/// slash survives cleaning, so `/patch/` stays distinct from `/patch`.
fn route_path(url: &str) -> String {
    let raw = url.split_once('?').map_or(url, |(path, _)| path);
    let decoded: Cow<'_, str> = percent_decode_str(raw).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let mut path = format!("/{}", segments.join("/"));
    if decoded.ends_with('/') && path != "/" {
        path.push('/');
    }
    path
}
