//! Serves the configured directory tree for every non-patch path.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use camino::Utf8PathBuf;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tiny_http::{Request, Response, ResponseBox};
use tracing::debug;

use super::{LISTENER_TARGET, send, text_response, with_header};

const INDEX_FILE: &str = "index.html";
const SNIFF_LEN: usize = 512;

/// Characters escaped in listing hrefs.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Static file tree rooted at a directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

/// What a static lookup resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StaticReply {
    File {
        bytes: Vec<u8>,
        content_type: &'static str,
    },
    Listing(String),
    Redirect(String),
    NotFound,
    Forbidden,
    Failed,
}

impl StaticFiles {
    /// Serves files under `base`.
    #[must_use]
    pub fn new(base: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base.into().into_std_path_buf(),
        }
    }

    /// Answers `request` from the file tree.
    pub fn serve(&self, request: Request) {
        let reply = self.reply(request.url());
        debug!(
            target: LISTENER_TARGET,
            url = %request.url(),
            reply = reply.describe(),
            "static request"
        );
        send(request, reply.into_response());
    }

    /// Resolves a raw request target (path plus optional query).
    pub(crate) fn reply(&self, target: &str) -> StaticReply {
        let (raw_path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let Ok(url_path) = percent_decode_str(raw_path).decode_utf8() else {
            return StaticReply::NotFound;
        };
        let url_path = if url_path.starts_with('/') {
            url_path.into_owned()
        } else {
            format!("/{url_path}")
        };

        if let Some(dir) = url_path.strip_suffix(INDEX_FILE)
            && dir.ends_with('/')
        {
            return StaticReply::Redirect(with_query("./", query));
        }

        let Some(path) = self.map_path(&url_path) else {
            return StaticReply::NotFound;
        };
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(error) => return StaticReply::from_error(&error),
        };

        if metadata.is_dir() {
            if !url_path.ends_with('/') {
                let location = format!("{}/", last_segment(&url_path));
                return StaticReply::Redirect(with_query(&location, query));
            }
            let index = path.join(INDEX_FILE);
            if index.is_file() {
                return read_file(&index);
            }
            return match render_listing(&path) {
                Ok(html) => StaticReply::Listing(html),
                Err(error) => StaticReply::from_error(&error),
            };
        }

        if url_path.ends_with('/') {
            let trimmed = url_path.trim_end_matches('/');
            let location = format!("../{}", last_segment(trimmed));
            return StaticReply::Redirect(with_query(&location, query));
        }
        read_file(&path)
    }

    /// Joins `url_path` onto the base directory, refusing anything that
    /// could step outside it.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.base_dir.clone();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path)
    }
}

impl StaticReply {
    fn from_error(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidFilename => Self::NotFound,
            _ => Self::Failed,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Listing(_) => "listing",
            Self::Redirect(_) => "redirect",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Failed => "failed",
        }
    }

    fn into_response(self) -> ResponseBox {
        match self {
            Self::File {
                bytes,
                content_type,
            } => with_header(Response::from_data(bytes), "Content-Type", content_type).boxed(),
            Self::Listing(html) => with_header(
                Response::from_data(html.into_bytes()),
                "Content-Type",
                "text/html; charset=utf-8",
            )
            .boxed(),
            Self::Redirect(location) => {
                with_header(Response::empty(301), "Location", &location).boxed()
            }
            Self::NotFound => text_response(404, "404 page not found"),
            Self::Forbidden => text_response(403, "403 Forbidden"),
            Self::Failed => text_response(500, "500 Internal Server Error"),
        }
    }
}

fn read_file(path: &Path) -> StaticReply {
    match fs::read(path) {
        Ok(bytes) => {
            let content_type = content_type(path, &bytes);
            StaticReply::File {
                bytes,
                content_type,
            }
        }
        Err(error) => StaticReply::from_error(&error),
    }
}

fn content_type(path: &Path, bytes: &[u8]) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/vnd.microsoft.icon",
        "wasm" => "application/wasm",
        "xml" => "text/xml; charset=utf-8",
        "pdf" => "application/pdf",
        _ if looks_like_text(bytes) => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// UTF-8 with no NUL in the first [`SNIFF_LEN`] bytes. A multi-byte
/// sequence cut by the window still counts as text.
fn looks_like_text(bytes: &[u8]) -> bool {
    let window = bytes.get(..SNIFF_LEN).unwrap_or(bytes);
    if window.contains(&0) {
        return false;
    }
    match std::str::from_utf8(window) {
        Ok(_) => true,
        Err(error) => error.error_len().is_none(),
    }
}

fn render_listing(dir: &Path) -> io::Result<String> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for name in &names {
        let href = utf8_percent_encode(name, HREF).to_string();
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape_html(&href),
            escape_html(name)
        ));
    }
    html.push_str("</pre>\n");
    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn last_segment(url_path: &str) -> &str {
    url_path.rsplit('/').next().unwrap_or(url_path)
}

fn with_query(location: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{location}?{query}"),
        _ => location.to_owned(),
    }
}
