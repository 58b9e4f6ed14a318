use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use may::coroutine::{self, JoinHandle};
use may::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use super::channel::FramedChannel;
use super::service::ConnectionService;
use crate::dispatcher::Dispatcher;
use crate::runtime_config::RuntimeConfig;

/// Persistent-connection server: accepts TCP connections and serves each one
/// with its own coroutine running the framed message loop.
pub struct WireServer {
    dispatcher: Arc<Dispatcher>,
    config: RuntimeConfig,
}

/// Handle to a running server.
///
/// Provides methods for waiting until the server accepts connections,
/// stopping it, or joining the accept coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is actually bound to (useful with port 0).
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections.
    ///
    /// Polls the bound address with plain TCP connects. Useful in tests to
    /// avoid racing the accept loop.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not accepting within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if std::net::TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the accept loop and wait for it to finish.
    ///
    /// Connections already being served keep their coroutines until their
    /// peers disconnect.
    #[allow(unsafe_code)]
    pub fn stop(self) {
        // SAFETY: cancel() is marked unsafe by the may runtime. The handle is
        // valid (we own it) and cancelling the accept loop is the intended
        // shutdown path.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the accept coroutine exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

/// Spawn one coroutine serving a single accepted connection.
#[allow(unsafe_code)]
fn spawn_connection(service: ConnectionService, stream: TcpStream, stack_size: usize) {
    let peer = stream.peer_addr().ok();
    info!(peer = ?peer, "Connection accepted");

    // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may
    // runtime. The closure is Send + 'static and reaches shared state only
    // through the Arc'd dispatcher, which is immutable during traffic.
    let spawned = unsafe {
        coroutine::Builder::new()
            .stack_size(stack_size)
            .spawn(move || {
                let mut channel = FramedChannel::new(stream);
                match service.serve(&mut channel) {
                    Ok(()) => info!(peer = ?peer, "Connection closed"),
                    Err(err) => error!(
                        peer = ?peer,
                        error = %err,
                        "Connection terminated on fatal error"
                    ),
                }
            })
    };
    if let Err(err) = spawned {
        error!(error = %err, "Failed to spawn connection coroutine");
    }
}

impl WireServer {
    /// Create a server over a finished dispatcher, with runtime configuration
    /// read from the environment.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        WireServer {
            dispatcher,
            config: RuntimeConfig::from_env(),
        }
    }

    #[must_use]
    pub fn with_config(dispatcher: Arc<Dispatcher>, config: RuntimeConfig) -> Self {
        WireServer { dispatcher, config }
    }

    /// Bind the listener and start accepting connections.
    ///
    /// Each accepted connection gets one coroutine (stack size from
    /// [`RuntimeConfig`]) running the sequential message loop until the peer
    /// disconnects or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the port cannot be bound,
    /// or the accept coroutine cannot be spawned.
    #[allow(unsafe_code)]
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let stack_size = self.config.stack_size;
        let dispatcher = self.dispatcher;

        // SAFETY: as in spawn_connection; the accept loop owns the listener
        // and hands each stream to exactly one connection coroutine.
        let handle = unsafe {
            coroutine::Builder::new()
                .stack_size(stack_size)
                .spawn(move || {
                    info!(addr = %addr, "Server listening");
                    for stream in listener.incoming() {
                        match stream {
                            Ok(stream) => {
                                let service = ConnectionService::new(dispatcher.clone());
                                spawn_connection(service, stream, stack_size);
                            }
                            Err(err) => warn!(error = %err, "Failed to accept connection"),
                        }
                    }
                })
        }?;

        Ok(ServerHandle { addr, handle })
    }
}
