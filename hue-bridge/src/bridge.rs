//! The bridge process: discovery responder and control plane wired to one
//! shared state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use bridge_server::{BridgeServer, ControlPlane, Profile, ServerConfig};
use hue_discovery::{ssdp, BridgeIdentity, DiscoveryResponder, ResponderConfig};
use hue_state::{ChangeCallback, HueState, LightId};
use hue_storage::{JsonFile, KeyValueStore, Memory};
use tokio::runtime::Handle;

use crate::config::BridgeConfig;
use crate::error::Result;

/// A running emulated bridge.
///
/// Owns the HTTP listener and the discovery socket. Lights added through
/// [`add_light`](Self::add_light) are immediately visible to clients.
///
/// ```rust,no_run
/// use hue_bridge::{BridgeConfig, HueBridge};
///
/// # #[tokio::main]
/// # async fn main() -> hue_bridge::Result<()> {
/// let bridge = HueBridge::start(BridgeConfig::default().with_port(8080)).await?;
/// let id = bridge.add_light("kitchen", None)?;
/// println!("light {id} served at {}", bridge.base_url());
/// bridge.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct HueBridge {
    state: Arc<HueState>,
    identity: BridgeIdentity,
    advertise_ip: Ipv4Addr,
    server: BridgeServer,
    responder: DiscoveryResponder,
    runtime: Handle,
}

impl HueBridge {
    /// Start both listeners.
    ///
    /// Fails when no advertisable address can be found and none is
    /// configured, when the store cannot be opened, or when either socket
    /// cannot be bound.
    pub async fn start(config: BridgeConfig) -> Result<Self> {
        let advertise_ip = match config.advertise_ip {
            Some(ip) => ip,
            None => hue_discovery::detect_advertise_ip()?,
        };
        let identity = BridgeIdentity::default();

        let store = Self::open_store(&config).await?;
        let state = Arc::new(HueState::load(store)?);

        let control = ControlPlane::new(Arc::clone(&state), config.profile)?
            .with_trace_requests(config.debug);
        let server = BridgeServer::start(
            ServerConfig {
                port: config.port,
                advertise_ip: IpAddr::V4(advertise_ip),
                identity: identity.clone(),
                trace_requests: config.debug,
            },
            control,
        )
        .await?;

        let location = ssdp::location_url(advertise_ip, server.port());
        let responder = DiscoveryResponder::bind(
            ResponderConfig::new(identity.clone(), location)
                .with_port(config.discovery_port)
                .with_trace_requests(config.debug),
        )
        .await?;

        tracing::info!(
            bridge_id = identity.bridge_id(),
            profile = %config.profile,
            "Bridge is up at {}",
            server.base_url()
        );

        Ok(Self {
            state,
            identity,
            advertise_ip,
            server,
            responder,
            runtime: Handle::current(),
        })
    }

    async fn open_store(config: &BridgeConfig) -> Result<KeyValueStore> {
        let store = match (&config.storage_path, config.profile) {
            (Some(path), Profile::Full) => KeyValueStore::open(JsonFile::new(path.clone())).await?,
            (Some(path), Profile::Demo) => {
                tracing::warn!(path = %path.display(), "Demo profile keeps state in memory, ignoring storage path");
                KeyValueStore::open(Memory::new()).await?
            }
            (None, _) => KeyValueStore::open(Memory::new()).await?,
        };
        tracing::debug!(backend = store.backend_name(), "Opened bridge store");
        Ok(store)
    }

    /// Add a light seeded from the color lamp template.
    ///
    /// Ids start at 0 and are never reused. The store is flushed in the
    /// background; a failed flush is logged and the light stays registered.
    pub fn add_light(&self, name: &str, on_change: Option<ChangeCallback>) -> Result<LightId> {
        let id = self.state.lights().add_light(name, on_change)?;

        let state = Arc::clone(&self.state);
        self.runtime.spawn(async move {
            if let Err(e) = state.persist().await {
                tracing::error!(light = id, error = %e, "Failed to persist new light");
            }
        });

        Ok(id)
    }

    /// Flush the store and wait for the write to complete.
    pub async fn persist(&self) -> Result<()> {
        self.state.persist().await?;
        Ok(())
    }

    pub fn state(&self) -> &Arc<HueState> {
        &self.state
    }

    pub fn identity(&self) -> &BridgeIdentity {
        &self.identity
    }

    pub fn advertise_ip(&self) -> Ipv4Addr {
        self.advertise_ip
    }

    /// HTTP port actually bound.
    pub fn port(&self) -> u16 {
        self.server.port()
    }

    /// `http://<advertise_ip>:<port>`
    pub fn base_url(&self) -> &str {
        self.server.base_url()
    }

    pub fn discovery_addr(&self) -> SocketAddr {
        self.responder.local_addr()
    }

    /// Stop both listeners and flush the store one last time.
    pub async fn shutdown(self) {
        self.responder.shutdown().await;
        self.server.shutdown().await;

        if let Err(e) = self.state.persist().await {
            tracing::error!(error = %e, "Failed to persist bridge state on shutdown");
        }
        tracing::info!("Bridge stopped");
    }
}
