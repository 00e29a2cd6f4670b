use thiserror::Error;

/// Errors raised while starting or driving the bridge process.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Discovery error: {0}")]
    Discovery(#[from] hue_discovery::DiscoveryError),

    #[error("Server error: {0}")]
    Server(#[from] bridge_server::ServerError),

    #[error("State error: {0}")]
    State(#[from] hue_state::StateError),

    #[error("Storage error: {0}")]
    Storage(#[from] hue_storage::StorageError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hue_discovery::DiscoveryError;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_missing_address_is_a_discovery_error() {
        let interfaces = vec![("lo".to_string(), IpAddr::from(Ipv4Addr::LOCALHOST))];
        let err: BridgeError = hue_discovery::select_advertise_ip(&interfaces, None)
            .unwrap_err()
            .into();

        assert!(matches!(err, BridgeError::Discovery(DiscoveryError::NoAddress(_))));
        assert!(err.to_string().starts_with("Discovery error: No advertisable IPv4 address found"));
    }
}
