//! HTTP server for the WebSub callback endpoint.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use warp::http::StatusCode;
use warp::Filter;

use crate::handler::NotificationHandler;

/// Fixed path on which the hub verifies the subscription and delivers
/// notifications. Appended to the base URL when building `hub.callback`.
pub const CALLBACK_PATH: &str = "/pubsubcallback";

/// Path segment form of [`CALLBACK_PATH`] for route matching.
const CALLBACK_SEGMENT: &str = "pubsubcallback";

/// Query parameter carrying the hub's verification challenge.
const CHALLENGE_PARAM: &str = "hub.challenge";

/// Errors from starting the callback server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No port in the configured range could be bound
    #[error("no available port in range {start}-{end}")]
    NoAvailablePort {
        /// First port tried
        start: u16,
        /// Last port tried
        end: u16,
    },

    /// The local IP address could not be determined
    #[error("failed to detect local IP address")]
    LocalIpDetection,

    /// The server task died before signalling readiness
    #[error("server failed to start")]
    StartupFailed,
}

/// HTTP callback server for WebSub subscription verification and
/// notification delivery.
///
/// The server binds to the first free port in a configured range and
/// registers two operations under [`CALLBACK_PATH`]:
///
/// - `GET` answers the hub's intent-verification handshake by echoing the
///   `hub.challenge` query parameter. No state is touched on this path.
/// - `POST` forwards non-empty notification bodies to the configured
///   [`NotificationHandler`] and acknowledges with an empty `200 OK`
///   regardless of what the handler does, so the hub never sees a delivery
///   failure for a payload this subscriber chose to drop.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use callback_server::{CallbackServer, ChannelHandler};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() {
///     let (tx, _rx) = mpsc::unbounded_channel();
///     let server = CallbackServer::bind((8080, 8180), Arc::new(ChannelHandler::new(tx)))
///         .await
///         .expect("failed to start callback server");
///     println!("listening at {}", server.callback_url());
/// }
/// ```
pub struct CallbackServer {
    /// The port the server is bound to
    port: u16,
    /// Base URL (scheme, host, port) for callback registration
    base_url: String,
    /// Shutdown signal sender
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Server task handle
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl CallbackServer {
    /// Create and start a callback server.
    ///
    /// Finds a free port in `port_range`, detects the local IP address for
    /// callback-URL construction, and starts the HTTP server. Returns once
    /// the server is accepting connections.
    ///
    /// # Arguments
    ///
    /// * `port_range` - Inclusive range of ports to try binding to
    /// * `handler` - Receiver for delivered notification bodies
    pub async fn bind(
        port_range: (u16, u16),
        handler: Arc<dyn NotificationHandler>,
    ) -> Result<Self, ServerError> {
        let port = Self::find_available_port(port_range.0, port_range.1).ok_or(
            ServerError::NoAvailablePort {
                start: port_range.0,
                end: port_range.1,
            },
        )?;

        let local_ip = Self::detect_local_ip().ok_or(ServerError::LocalIpDetection)?;
        let base_url = format!("http://{local_ip}:{port}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (ready_tx, mut ready_rx) = mpsc::channel::<()>(1);

        let server_handle = Self::start_server(port, handler, shutdown_rx, ready_tx);

        // If the server task dies before binding, the ready sender is
        // dropped and recv returns None.
        ready_rx.recv().await.ok_or(ServerError::StartupFailed)?;

        info!(%base_url, path = CALLBACK_PATH, "callback server listening");

        Ok(Self {
            port,
            base_url,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// Base URL of the server, e.g. `http://192.168.1.10:8080`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full callback URL to register with the hub.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.base_url, CALLBACK_PATH)
    }

    /// Port the server is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Shut the server down gracefully, waiting for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
    }

    /// Find an available port in the given inclusive range.
    fn find_available_port(start: u16, end: u16) -> Option<u16> {
        (start..=end).find(|&port| Self::is_port_available(port))
    }

    /// Check whether a port can currently be bound.
    fn is_port_available(port: u16) -> bool {
        TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)).is_ok()
    }

    /// Detect the local IP address used for outbound traffic.
    ///
    /// Opens a UDP socket towards a public address to learn the routing
    /// source address; no packet is actually sent.
    fn detect_local_ip() -> Option<IpAddr> {
        let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        Some(socket.local_addr().ok()?.ip())
    }

    /// Start the HTTP server task on the given port.
    fn start_server(
        port: u16,
        handler: Arc<dyn NotificationHandler>,
        mut shutdown_rx: mpsc::Receiver<()>,
        ready_tx: mpsc::Sender<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            // Verification: echo hub.challenge back, or an empty body when
            // the parameter is absent. warp rejects on a missing query
            // string entirely, hence the empty-map fallback.
            let verify = warp::get()
                .and(warp::path(CALLBACK_SEGMENT))
                .and(warp::path::end())
                .and(
                    warp::query::<HashMap<String, String>>()
                        .or(warp::any().map(HashMap::<String, String>::new))
                        .unify(),
                )
                .map(|params: HashMap<String, String>| {
                    if let Some(mode) = params.get("hub.mode") {
                        let topic = params.get("hub.topic").map(String::as_str).unwrap_or("");
                        debug!(%mode, %topic, "hub verification request");
                    }
                    match params.get(CHALLENGE_PARAM) {
                        Some(challenge) => {
                            debug!(%challenge, "echoing challenge");
                            challenge.clone()
                        }
                        None => {
                            debug!("verification request without challenge");
                            String::new()
                        }
                    }
                });

            // Notification delivery: hand the body to the handler, then
            // acknowledge. The status is 200 no matter what, since the hub
            // treats anything else as a delivery failure and will retry and
            // eventually drop the subscription.
            let notify = warp::post()
                .and(warp::path(CALLBACK_SEGMENT))
                .and(warp::path::end())
                .and(warp::body::bytes())
                .and_then(move |body: bytes::Bytes| {
                    let handler = handler.clone();
                    async move {
                        if body.is_empty() {
                            debug!("empty notification body, acknowledging without dispatch");
                        } else {
                            debug!(bytes = body.len(), "notification received");
                            let payload = String::from_utf8_lossy(&body).into_owned();
                            handler.handle(payload).await;
                        }
                        Ok::<_, warp::Rejection>(warp::reply::with_status(
                            String::new(),
                            StatusCode::OK,
                        ))
                    }
                });

            let routes = verify.or(notify);

            let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
                async move {
                    shutdown_rx.recv().await;
                },
            );

            debug!(%addr, "callback server bound");
            let _ = ready_tx.send(()).await;
            server.await;
        })
    }
}
