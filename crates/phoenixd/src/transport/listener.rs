//! Listener that feeds `tiny_http` requests to a [`RequestHandler`].

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{
    Arc, Condvar, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use phoenix_config::ListenAddress;

use super::{LISTENER_TARGET, ListenerError, RequestHandler};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Bound TCP socket, not yet serving.
#[derive(Debug)]
pub struct HttpListener {
    address: ListenAddress,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl HttpListener {
    /// Resolves and binds the configured address.
    pub fn bind(address: &ListenAddress) -> Result<Self, ListenerError> {
        let listener = bind_tcp(address)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            address: address.clone(),
            listener,
            local_addr,
        })
    }

    /// Address the socket is bound to; reports the real port when `0` was
    /// requested.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts serving on a background accept thread.
    pub fn start(self, handler: Arc<dyn RequestHandler>) -> Result<ListenerHandle, ListenerError> {
        let server = tiny_http::Server::from_listener(self.listener, None)
            .map_err(|error| ListenerError::Server {
                source: io::Error::other(error),
            })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let in_flight = Arc::new(InFlight::default());
        let accept = {
            let shutdown = Arc::clone(&shutdown);
            let in_flight = Arc::clone(&in_flight);
            let address = self.address;
            thread::spawn(move || run_accept_loop(&server, &address, &shutdown, &in_flight, handler))
        };
        Ok(ListenerHandle {
            local_addr: self.local_addr,
            shutdown,
            in_flight,
            accept: Some(accept),
        })
    }
}

/// Handle to a running listener.
///
/// Dropping the handle stops the accept loop but does not wait for it.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    in_flight: Arc<InFlight>,
    accept: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of requests currently being handled.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    /// Stops taking new requests and joins the accept loop.
    ///
    /// Once this returns no further request can be dispatched, so a later
    /// [`wait_idle`](Self::wait_idle) accounts for every request accepted.
    /// Calling it again is a no-op.
    pub fn stop_accepting(&mut self) -> Result<(), ListenerError> {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.accept.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }

    /// Blocks until no request is in flight or `deadline` passes. Returns
    /// `true` when the listener drained in time.
    #[must_use]
    pub fn wait_idle(&self, deadline: Instant) -> bool {
        self.in_flight.wait_idle(deadline)
    }

    /// Stops accepting without waiting for in-flight requests.
    pub fn close(mut self) -> Result<(), ListenerError> {
        self.stop_accepting()
    }

    /// Stops accepting and abandons whatever is still in flight.
    ///
    /// Abandoned request threads keep their sockets until the process exits
    /// or replaces its image; the sockets are close-on-exec. Returns the
    /// number of abandoned requests.
    pub fn force_close(mut self) -> Result<usize, ListenerError> {
        self.stop_accepting()?;
        let abandoned = self.in_flight.count();
        if abandoned > 0 {
            warn!(
                target: LISTENER_TARGET,
                abandoned,
                "abandoning in-flight requests"
            );
        }
        Ok(abandoned)
    }

    #[cfg(test)]
    pub(crate) fn with_accept_thread(accept: thread::JoinHandle<()>) -> Self {
        Self {
            local_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            shutdown: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(InFlight::default()),
            accept: Some(accept),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Count of requests being handled, with a condition variable signalled
/// whenever it drops.
#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn count(&self) -> usize {
        *self.lock()
    }

    fn enter(self: &Arc<Self>) -> InFlightGuard {
        *self.lock() += 1;
        InFlightGuard {
            tracker: Arc::clone(self),
        }
    }

    fn wait_idle(&self, deadline: Instant) -> bool {
        let mut count = self.lock();
        while *count > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            count = self
                .idle
                .wait_timeout(count, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
        true
    }
}

struct InFlightGuard {
    tracker: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut count = self.tracker.lock();
        *count = count.saturating_sub(1);
        self.tracker.idle.notify_all();
    }
}

fn run_accept_loop(
    server: &tiny_http::Server,
    address: &ListenAddress,
    shutdown: &AtomicBool,
    in_flight: &Arc<InFlight>,
    handler: Arc<dyn RequestHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        %address,
        "http listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_BACKOFF) {
            Ok(Some(request)) => {
                last_error = None;
                debug!(
                    target: LISTENER_TARGET,
                    method = %request.method(),
                    url = %request.url(),
                    "request received"
                );
                let guard = in_flight.enter();
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    let _guard = guard;
                    handler.handle(request);
                });
            }
            Ok(None) => {}
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "http receive error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    debug!(target: LISTENER_TARGET, %address, "http listener stopped accepting");
}

fn bind_tcp(address: &ListenAddress) -> Result<TcpListener, ListenerError> {
    let host = address.host();
    let target = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{}", address.port())
    } else {
        format!("{host}:{}", address.port())
    };
    let mut addrs = target
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            address: address.to_string(),
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        address: address.to_string(),
    })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
