//! UDP discovery responder.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::error::{DiscoveryError, Result};
use crate::identity::BridgeIdentity;
use crate::ssdp::{self, SSDP_MULTICAST_ADDR, SSDP_PORT};

/// Settings for a [`DiscoveryResponder`].
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// UDP port to listen on (1900 for real clients)
    pub port: u16,
    /// Multicast group to join
    pub multicast_group: Ipv4Addr,
    /// LOCATION advertised in every response
    pub location: String,
    /// Identity whose UUID and bridge id are advertised
    pub identity: BridgeIdentity,
    /// Log every M-SEARCH at info level instead of debug
    pub trace_requests: bool,
}

impl ResponderConfig {
    pub fn new(identity: BridgeIdentity, location: impl Into<String>) -> Self {
        Self {
            port: SSDP_PORT,
            multicast_group: SSDP_MULTICAST_ADDR,
            location: location.into(),
            identity,
            trace_requests: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_trace_requests(mut self, trace_requests: bool) -> Self {
        self.trace_requests = trace_requests;
        self
    }
}

/// Answers SSDP M-SEARCH requests on behalf of the bridge.
///
/// Every datagram containing `M-SEARCH` is answered with exactly three
/// unicast responses sent back to the requester. Anything else is ignored.
/// Sends are fire-and-forget: failures are logged and never retried.
pub struct DiscoveryResponder {
    local_addr: SocketAddr,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl DiscoveryResponder {
    /// Bind the socket, join the multicast group and start answering.
    ///
    /// Failing to join the group is logged and tolerated: unicast searches
    /// sent straight to the port are still answered.
    pub async fn bind(config: ResponderConfig) -> Result<Self> {
        let socket = Self::bind_socket(config.port)?;

        if let Err(e) = socket.join_multicast_v4(config.multicast_group, Ipv4Addr::UNSPECIFIED) {
            tracing::warn!(
                group = %config.multicast_group,
                error = %e,
                "Failed to join multicast group, only unicast searches will be answered"
            );
        }

        let local_addr = socket.local_addr()?;
        tracing::info!("Discovery is listening on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let handle = tokio::spawn(Self::run(Arc::new(socket), config, shutdown_rx));

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Address the responder is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop answering and wait for the receive loop to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    fn bind_socket(port: u16) -> Result<UdpSocket> {
        let bind_error = |source| DiscoveryError::Bind { port, source };

        let socket =
            Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(bind_error)?;
        socket.set_reuse_address(true).map_err(bind_error)?;
        socket.set_nonblocking(true).map_err(bind_error)?;
        socket
            .bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into())
            .map_err(bind_error)?;

        UdpSocket::from_std(socket.into()).map_err(bind_error)
    }

    async fn run(socket: Arc<UdpSocket>, config: ResponderConfig, mut shutdown_rx: mpsc::Receiver<()>) {
        let responses = ssdp::render_responses(&config.identity, &config.location);
        let mut buffer = [0u8; 2048];

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::debug!("Discovery responder shutting down");
                    break;
                }
                received = socket.recv_from(&mut buffer) => {
                    let (size, peer) = match received {
                        Ok(received) => received,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to receive discovery datagram");
                            continue;
                        }
                    };

                    if !ssdp::is_search_request(&buffer[..size]) {
                        continue;
                    }

                    if config.trace_requests {
                        tracing::info!("Received M-SEARCH from {}", peer);
                    } else {
                        tracing::debug!("Received M-SEARCH from {}", peer);
                    }

                    for response in &responses {
                        if let Err(e) = socket.send_to(response.as_bytes(), peer).await {
                            tracing::warn!(%peer, error = %e, "Failed to send discovery response");
                        }
                    }
                }
            }
        }
    }
}

impl Drop for DiscoveryResponder {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
