//! HTTP listener serving the description document and the bridge API.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use hue_discovery::{description_xml, ssdp::DESCRIPTION_PATH, BridgeIdentity};
use tokio::sync::mpsc;
use warp::http::Method;
use warp::path::FullPath;
use warp::{Filter, Reply as WarpReply};

use crate::control::{ControlPlane, Reply};
use crate::error::{Result, ServerError};

/// Settings for a [`BridgeServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on; 0 picks a free one
    pub port: u16,
    /// Address clients are told to use
    pub advertise_ip: IpAddr,
    /// Identity embedded in the description document
    pub identity: BridgeIdentity,
    /// Log every request at info level instead of debug
    pub trace_requests: bool,
}

/// HTTP server of the emulated bridge.
///
/// Serves `GET /description.xml` and hands every other request to a
/// [`ControlPlane`]. Requests with no matching handler get a bare 404.
///
/// # Example
///
/// ```no_run
/// use std::net::{IpAddr, Ipv4Addr};
/// use std::sync::Arc;
/// use bridge_server::{BridgeServer, ControlPlane, Profile, ServerConfig};
/// use hue_discovery::BridgeIdentity;
/// use hue_state::HueState;
/// use hue_storage::{KeyValueStore, Memory};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let state = Arc::new(HueState::load(KeyValueStore::open(Memory::new()).await?)?);
/// let control = ControlPlane::new(state, Profile::Full)?;
/// let config = ServerConfig {
///     port: 8080,
///     advertise_ip: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
///     identity: BridgeIdentity::default(),
///     trace_requests: false,
/// };
/// let server = BridgeServer::start(config, control).await?;
/// println!("bridge API at {}/api", server.base_url());
/// server.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct BridgeServer {
    /// Address the listener is bound to
    local_addr: SocketAddr,
    /// `http://<advertise_ip>:<port>`
    base_url: String,
    /// Shutdown signal sender
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Server task handle
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl BridgeServer {
    /// Bind the listener and start serving.
    ///
    /// The description document is rendered once the port is known, so
    /// port 0 advertises the port actually bound.
    pub async fn start(config: ServerConfig, control: ControlPlane) -> Result<Self> {
        let description = Arc::new(OnceLock::new());
        let routes = Self::routes(
            Arc::new(control),
            Arc::clone(&description),
            config.trace_requests,
        );

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.port);

        let (local_addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, async move {
                shutdown_rx.recv().await;
            })
            .map_err(|e| ServerError::Bind {
                addr: bind_addr,
                message: e.to_string(),
            })?;

        let _ = description.set(description_xml(
            config.advertise_ip,
            local_addr.port(),
            config.identity.serial_number(),
            config.identity.uuid(),
        ));

        tracing::info!("Api is listening on {}", local_addr);
        let server_handle = tokio::spawn(server);

        Ok(Self {
            local_addr,
            base_url: format!("http://{}:{}", config.advertise_ip, local_addr.port()),
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// Port the listener is bound to.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL advertised to clients.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop accepting requests and wait for in-flight ones to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }

        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
    }

    fn routes(
        control: Arc<ControlPlane>,
        description: Arc<OnceLock<String>>,
        trace_requests: bool,
    ) -> impl Filter<Extract = impl WarpReply, Error = warp::Rejection> + Clone + Send + Sync + 'static {
        let description_route = warp::get()
            .and(warp::path(DESCRIPTION_PATH.trim_start_matches('/')))
            .and(warp::path::end())
            .map(move || {
                let xml = description.get().cloned().unwrap_or_default();
                warp::reply::with_header(xml, "Content-Type", "text/xml")
            });

        let api_route = warp::method()
            .and(warp::path::full())
            .and(warp::body::bytes())
            .and_then(move |method: Method, path: FullPath, body: Bytes| {
                let control = Arc::clone(&control);
                async move {
                    let reply = control.dispatch(&method, path.as_str(), &body).await;
                    Ok::<_, Infallible>(reply)
                }
            });

        let log = warp::log::custom(move |info: warp::log::Info<'_>| {
            let remote = info
                .remote_addr()
                .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string());
            if trace_requests {
                tracing::info!("{} {} {} {}", remote, info.method(), info.path(), info.status());
            } else {
                tracing::debug!("{} {} {} {}", remote, info.method(), info.path(), info.status());
            }
        });

        description_route.or(api_route).with(log)
    }
}

impl WarpReply for Reply {
    fn into_response(self) -> warp::reply::Response {
        let status = self.status();
        match self.into_body() {
            Some(body) => warp::reply::with_status(warp::reply::json(&body), status).into_response(),
            None => status.into_response(),
        }
    }
}
