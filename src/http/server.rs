//! HTTP server setup and listener lifecycle.
//!
//! # Responsibilities
//! - Wrap the dispatcher in the transport stack (tracing, deadlines,
//!   body limit, request ID)
//! - Start and stop the plaintext and TLS listeners independently
//! - Drain in-flight requests within a bounded grace period on shutdown
//!
//! # Design Decisions
//! - The router is passed in explicitly; several servers may coexist
//! - `start*` returns once the socket is bound; serving continues in a task
//! - Shutdown before start, or twice, is an error, never a panic
//! - Connections still open when the grace period ends are closed and the
//!   shutdown reports `ShutdownTimeout`
//! - The config is validated on every `start*`, not only when loaded from disk

use axum_server::Handle;
use hyper_util::rt::TokioTimer;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, ServerConfig};
use crate::http::dispatcher::Dispatcher;
use crate::net::tls::load_server_tls;
use crate::routing::Router;

/// Time allowed for the serving task to exit once connections are force-closed.
const SHUTDOWN_MARGIN: Duration = Duration::from_secs(1);

/// Which of the two listeners an operation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Plain,
    Secure,
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerKind::Plain => f.write_str("HTTP"),
            ListenerKind::Secure => f.write_str("HTTPS"),
        }
    }
}

/// Errors from starting or stopping a listener.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{listener} listener is already running on {addr}")]
    AlreadyRunning {
        listener: ListenerKind,
        addr: SocketAddr,
    },
    #[error("{0} listener is not running")]
    NotRunning(ListenerKind),
    #[error("failed to bind {listener} listener to {address}: {source}")]
    Bind {
        listener: ListenerKind,
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid server configuration: {0}")]
    Config(#[source] ConfigError),
    #[error("failed to load TLS configuration: {0}")]
    Tls(#[source] io::Error),
    #[error("{listener} listener did not drain within {grace:?}")]
    ShutdownTimeout {
        listener: ListenerKind,
        grace: Duration,
    },
    #[error("{listener} listener failed: {source}")]
    Serve {
        listener: ListenerKind,
        #[source]
        source: io::Error,
    },
}

struct Running {
    addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
}

/// Serves a router over plaintext HTTP and/or HTTPS.
pub struct Server {
    dispatcher: Dispatcher,
    config: Arc<ServerConfig>,
    plain: Mutex<Option<Running>>,
    secure: Mutex<Option<Running>>,
}

impl Server {
    /// Create a server for `router`. Nothing is bound until `start*`.
    pub fn new(router: impl Into<Arc<Router>>, config: ServerConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(router.into()),
            config: Arc::new(config),
            plain: Mutex::new(None),
            secure: Mutex::new(None),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The dispatcher wrapped in the middleware layers used on the wire.
    #[allow(deprecated)]
    pub fn app(&self) -> axum::Router {
        axum::Router::new()
            .fallback_service(self.dispatcher.clone())
            .layer(RequestBodyLimitLayer::new(self.config.max_body_bytes))
            .layer(TimeoutLayer::new(self.config.write_timeout()))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Bind `host:port` and serve plaintext HTTP in the background.
    ///
    /// Returns the bound address (useful when `port` is 0).
    pub async fn start(&self) -> Result<SocketAddr, LifecycleError> {
        let listener = ListenerKind::Plain;
        let mut slot = self.plain.lock().await;
        if let Some(running) = slot.as_ref() {
            return Err(LifecycleError::AlreadyRunning {
                listener,
                addr: running.addr,
            });
        }

        self.check_config()?;
        let address = self.config.http_address();
        let addr = resolve(listener, &address).await?;
        let handle = Handle::new();

        let mut server = axum_server::bind(addr).handle(handle.clone());
        server
            .http_builder()
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout());

        let app = self.app();
        let task = tokio::spawn(async move { server.serve(app.into_make_service()).await });

        let running = await_listening(listener, &address, handle, task).await?;
        let addr = running.addr;
        *slot = Some(running);
        Ok(addr)
    }

    /// Load the certificate, bind `host:https_port`, and serve HTTPS in the
    /// background.
    pub async fn start_secure(&self) -> Result<SocketAddr, LifecycleError> {
        let listener = ListenerKind::Secure;
        let mut slot = self.secure.lock().await;
        if let Some(running) = slot.as_ref() {
            return Err(LifecycleError::AlreadyRunning {
                listener,
                addr: running.addr,
            });
        }

        self.check_config()?;
        let tls = load_server_tls(&self.config)
            .await
            .map_err(LifecycleError::Tls)?;
        let address = self.config.https_address();
        let addr = resolve(listener, &address).await?;
        let handle = Handle::new();

        let mut server = axum_server::bind_rustls(addr, tls).handle(handle.clone());
        server
            .http_builder()
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout());

        let app = self.app();
        let task = tokio::spawn(async move { server.serve(app.into_make_service()).await });

        let running = await_listening(listener, &address, handle, task).await?;
        let addr = running.addr;
        *slot = Some(running);
        Ok(addr)
    }

    /// Stop the plaintext listener, draining in-flight requests.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        self.stop(ListenerKind::Plain, &self.plain).await
    }

    /// Stop the TLS listener, draining in-flight requests.
    pub async fn shutdown_secure(&self) -> Result<(), LifecycleError> {
        self.stop(ListenerKind::Secure, &self.secure).await
    }

    /// Address of the plaintext listener while it runs.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.plain.lock().await.as_ref().map(|r| r.addr)
    }

    /// Address of the TLS listener while it runs.
    pub async fn secure_addr(&self) -> Option<SocketAddr> {
        self.secure.lock().await.as_ref().map(|r| r.addr)
    }

    fn check_config(&self) -> Result<(), LifecycleError> {
        validate_config(&self.config)
            .map_err(|errors| LifecycleError::Config(ConfigError::Validation(errors)))
    }

    async fn stop(
        &self,
        listener: ListenerKind,
        slot: &Mutex<Option<Running>>,
    ) -> Result<(), LifecycleError> {
        let Running {
            addr,
            handle,
            mut task,
        } = slot
            .lock()
            .await
            .take()
            .ok_or(LifecycleError::NotRunning(listener))?;

        let grace = self.config.shutdown_timeout();
        tracing::info!(
            listener = %listener,
            address = %addr,
            grace_secs = grace.as_secs(),
            in_flight = handle.connection_count(),
            "Shutting down listener"
        );
        // The deadline is enforced below, not by axum-server.
        handle.graceful_shutdown(None);

        let outcome = match tokio::time::timeout(grace, &mut task).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    listener = %listener,
                    address = %addr,
                    open_connections = handle.connection_count(),
                    "Listener did not drain in time, closing connections"
                );
                handle.shutdown();
                if tokio::time::timeout(SHUTDOWN_MARGIN, &mut task).await.is_err() {
                    task.abort();
                }
                return Err(LifecycleError::ShutdownTimeout { listener, grace });
            }
        };

        match outcome {
            Ok(Ok(())) => {
                tracing::info!(listener = %listener, address = %addr, "Listener stopped");
                Ok(())
            }
            Ok(Err(source)) => Err(LifecycleError::Serve { listener, source }),
            Err(join) => Err(LifecycleError::Serve {
                listener,
                source: io::Error::other(join),
            }),
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        for slot in [self.plain.get_mut(), self.secure.get_mut()] {
            if let Some(running) = slot.take() {
                running.handle.shutdown();
            }
        }
    }
}

async fn resolve(listener: ListenerKind, address: &str) -> Result<SocketAddr, LifecycleError> {
    let bind_error = |source| LifecycleError::Bind {
        listener,
        address: address.to_string(),
        source,
    };

    tokio::net::lookup_host(address)
        .await
        .map_err(bind_error)?
        .next()
        .ok_or_else(|| {
            bind_error(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "address did not resolve",
            ))
        })
}

/// Wait until the spawned server has bound its socket, or surface why not.
async fn await_listening(
    listener: ListenerKind,
    address: &str,
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
) -> Result<Running, LifecycleError> {
    match handle.listening().await {
        Some(addr) => {
            tracing::info!(listener = %listener, address = %addr, "Listening for connections");
            Ok(Running { addr, handle, task })
        }
        None => {
            let source = match task.await {
                Ok(Err(e)) => e,
                Ok(Ok(())) => io::Error::other("listener exited before binding"),
                Err(join) => io::Error::other(join),
            };
            Err(LifecycleError::Bind {
                listener,
                address: address.to_string(),
                source,
            })
        }
    }
}
