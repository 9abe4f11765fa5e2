//! Server lifecycle and the hyper transport.
//!
//! # Lifecycle
//!
//! ```text
//! Builder ──build()──► Stopped ──start()──► Running ──stop()──► Stopped
//! ```
//!
//! `build()` registers every route group, so a bad declaration fails before
//! anything is bound. `start()` on a running server and `stop()` on a stopped
//! one are errors and leave the state untouched.
//!
//! # Graceful shutdown
//!
//! `stop()` makes the accept loop:
//! 1. Stop calling `listener.accept()` and drop the listener.
//! 2. Signal every open connection to shut down gracefully. Idle keep-alive
//!    connections close at once; a connection mid-exchange finishes its
//!    response first.
//! 3. Wait for connection tasks to finish, for up to the configured grace
//!    period, then abort whatever is still running.
//!
//! [`Server::run`] ties this to SIGTERM / Ctrl-C for binaries.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, info_span, warn};

use crate::codec::{Codec, JsonCodec};
use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::{ConfigError, Error};
use crate::event::{Event, Pipeline};
use crate::request::Request;
use crate::router::{RouteGroup, RouteTable};

type Registration = Box<dyn FnOnce(&mut RouteTable) -> Result<usize, ConfigError>>;

/// The HTTP server.
///
/// ```rust,no_run
/// use missive::{Server, health::Health};
///
/// #[tokio::main]
/// async fn main() -> Result<(), missive::Error> {
///     Server::builder(8080)
///         .group(Health)
///         .build()?
///         .run()
///         .await
/// }
/// ```
pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    state: State,
}

enum State {
    Stopped,
    Running(Running),
}

struct Running {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    accept_loop: JoinHandle<()>,
}

/// Collects route groups, events and settings for a [`Server`].
pub struct Builder {
    config: ServerConfig,
    groups: Vec<Registration>,
    pipeline: Pipeline,
    codec: Arc<dyn Codec>,
}

impl Server {
    /// Starts a builder listening on every interface at `port`.
    pub fn builder(port: u16) -> Builder {
        Self::with_config(ServerConfig::new(port))
    }

    pub fn with_config(config: ServerConfig) -> Builder {
        Builder {
            config,
            groups: Vec::new(),
            pipeline: Pipeline::default(),
            codec: Arc::new(JsonCodec::compact()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// The bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Running(running) => Some(running.local_addr),
            State::Stopped => None,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the listener and begins serving the route table.
    ///
    /// Fails with [`Error::AlreadyRunning`] if the server is running, or with
    /// [`Error::Io`] if the address cannot be bound; either way the state is
    /// unchanged.
    pub async fn start(&mut self) -> Result<(), Error> {
        if self.is_running() {
            return Err(Error::AlreadyRunning);
        }

        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown, shutdown_rx) = oneshot::channel();
        let accept_loop = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.dispatcher),
            shutdown_rx,
            self.config.shutdown_grace(),
        ));

        self.state = State::Running(Running { local_addr, shutdown, accept_loop });

        info!(
            addr = %local_addr,
            routes = self.dispatcher.route_count(),
            events = self.dispatcher.event_count(),
            "missive listening"
        );
        Ok(())
    }

    /// Stops accepting, drains in-flight exchanges and unbinds the listener.
    ///
    /// Fails with [`Error::NotRunning`] if the server is stopped.
    pub async fn stop(&mut self) -> Result<(), Error> {
        let State::Running(running) = std::mem::replace(&mut self.state, State::Stopped) else {
            return Err(Error::NotRunning);
        };

        // The receiver only disappears if the accept loop already ended.
        if running.shutdown.send(()).is_err() {
            warn!("accept loop had already exited");
        }
        if let Err(e) = running.accept_loop.await {
            error!("accept loop failed: {e}");
        }

        info!(addr = %running.local_addr, "missive stopped");
        Ok(())
    }

    /// Starts, serves until SIGTERM or Ctrl-C, then stops.
    pub async fn run(mut self) -> Result<(), Error> {
        self.start().await?;
        shutdown_signal().await;
        self.stop().await
    }
}

impl Builder {
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Adds a route group. Its declaration is checked by [`build`](Self::build).
    pub fn group<G: RouteGroup>(mut self, group: G) -> Self {
        self.groups.push(Box::new(move |table: &mut RouteTable| table.register(group)));
        self
    }

    /// Appends an event to the pipeline. Events run in the order added.
    pub fn event(mut self, event: impl Event) -> Self {
        self.pipeline.push(Box::new(event));
        self
    }

    /// Replaces the default compact [`JsonCodec`].
    pub fn codec(mut self, codec: impl Codec) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Validates the configuration and builds the route table.
    pub fn build(self) -> Result<Server, Error> {
        self.config.validate()?;

        let mut routes = RouteTable::default();
        for register in self.groups {
            register(&mut routes)?;
        }

        Ok(Server {
            config: self.config,
            dispatcher: Arc::new(Dispatcher::new(routes, self.pipeline, self.codec)),
            state: State::Stopped,
        })
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    mut shutdown: oneshot::Receiver<()>,
    grace: Duration,
) {
    let http = ConnBuilder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            // Check shutdown first so a stop request wins over queued connections.
            biased;

            _ = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown requested, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let dispatcher = Arc::clone(&dispatcher);

                // Called once per request on the connection.
                let svc = service_fn(move |req| {
                    let dispatcher = Arc::clone(&dispatcher);
                    async move { exchange(dispatcher, req, remote_addr).await }
                });
                let conn = http.serve_connection(TokioIo::new(stream), svc).into_owned();
                let conn = graceful.watch(conn);

                tasks.spawn(async move {
                    // Body write failures land here too; the response is
                    // already committed, so logging is all that is left.
                    if let Err(e) = conn.await {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet stays small.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);

    let drained = tokio::time::timeout(grace, async {
        graceful.shutdown().await;
        while tasks.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        warn!(remaining = tasks.len(), "grace period elapsed, aborting connections");
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
    }
}

/// Handles one request: builds the context, dispatches it on the blocking
/// pool (handlers are synchronous and may block), and renders the envelope.
///
/// Infallible: every failure is already an envelope by the time hyper sees it.
async fn exchange(
    dispatcher: Arc<Dispatcher>,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, _body) = req.into_parts();
    let request = Request::from_parts(parts, remote_addr);
    let span = info_span!(
        "exchange",
        method = %request.raw_method(),
        path = %request.path(),
        peer = %remote_addr
    );

    let worker = Arc::clone(&dispatcher);
    let dispatched = tokio::task::spawn_blocking({
        let span = span.clone();
        move || span.in_scope(|| worker.dispatch(&request))
    })
    .await;

    let outcome = match dispatched {
        Ok(outcome) => outcome,
        Err(e) => {
            span.in_scope(|| error!("dispatch task failed: {e}"));
            Outcome::dispatch_failed()
        }
    };

    Ok(span.in_scope(|| dispatcher.render(outcome)))
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C). On
/// Windows only Ctrl-C is available. A signal that cannot be installed never
/// fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
