//! Settings for one bridge process.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use bridge_server::Profile;

/// Default HTTP port of a real bridge.
pub const DEFAULT_HTTP_PORT: u16 = 80;
/// Default SSDP port.
pub const DEFAULT_DISCOVERY_PORT: u16 = hue_discovery::ssdp::SSDP_PORT;

/// Configuration for [`HueBridge::start`](crate::HueBridge::start).
///
/// ```
/// use hue_bridge::BridgeConfig;
///
/// let config = BridgeConfig::default().with_port(8080).with_debug(true);
/// assert_eq!(config.port, 8080);
/// assert!(config.storage_path.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// HTTP port; 0 picks an ephemeral one
    pub port: u16,
    /// Trace every request, discovery search and state change at info level
    pub debug: bool,
    /// Route set and pairing behaviour
    pub profile: Profile,
    /// UDP port the discovery responder listens on
    pub discovery_port: u16,
    /// Address put into LOCATION and the description; detected when `None`
    pub advertise_ip: Option<Ipv4Addr>,
    /// JSON file backing the store; in-memory when `None`
    pub storage_path: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            debug: false,
            profile: Profile::Full,
            discovery_port: DEFAULT_DISCOVERY_PORT,
            advertise_ip: None,
            storage_path: None,
        }
    }
}

impl BridgeConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_discovery_port(mut self, port: u16) -> Self {
        self.discovery_port = port;
        self
    }

    pub fn with_advertise_ip(mut self, ip: Ipv4Addr) -> Self {
        self.advertise_ip = Some(ip);
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }
}
