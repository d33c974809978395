//! Test helpers for the transport module.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::thread;
use std::time::Duration;

use tiny_http::Request;

use super::{RequestHandler, send, text_response};

/// Answers every request with `200` and counts them.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl RequestHandler for CountingHandler {
    fn handle(&self, request: Request) {
        self.count.fetch_add(1, Ordering::SeqCst);
        send(request, text_response(200, "counted"));
    }
}

/// Holds each request for a fixed delay before answering.
pub(crate) struct SlowHandler {
    delay: Duration,
    started: Arc<AtomicUsize>,
}

impl SlowHandler {
    pub(crate) fn new(delay: Duration) -> (Arc<AtomicUsize>, Arc<Self>) {
        let started = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            delay,
            started: Arc::clone(&started),
        });
        (started, handler)
    }
}

impl RequestHandler for SlowHandler {
    fn handle(&self, request: Request) {
        self.started.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        send(request, text_response(200, "slow"));
    }
}

/// Parsed HTTP/1.1 response.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) head: String,
    pub(crate) body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (field, value) = line.split_once(':')?;
            field
                .trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_owned())
        })
    }
}

/// Sends one request over a fresh connection and reads until the server
/// closes it.
pub(crate) fn http_request(
    addr: SocketAddr,
    method: &str,
    target: &str,
    body: &[u8],
) -> RawResponse {
    let mut stream = TcpStream::connect(addr).expect("connect to listener");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("set read timeout");
    let head = format!(
        "{method} {target} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).expect("write request head");
    stream.write_all(body).expect("write request body");
    stream.flush().expect("flush request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).expect("read response");
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .expect("response should contain a header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let body = raw[split + 4..].to_vec();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status line should carry a code");
    RawResponse { status, head, body }
}
