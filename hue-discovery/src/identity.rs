//! Fixed identity of the emulated bridge.

/// Vendor part of the serial number (first three bytes of the MAC).
pub const SERIAL_PREFIX: &str = "001788";
/// Device part of the serial number.
pub const SERIAL_POSTFIX: &str = "7ebe7d";
/// Namespace the serial number is appended to when forming the UUID.
pub const UUID_NAMESPACE: &str = "2f402f80-da50-11e1-9b23-";

/// Serial number, bridge id and UUID advertised by the emulator.
///
/// Computed once at startup and immutable afterwards.
///
/// ```
/// use hue_discovery::BridgeIdentity;
///
/// let identity = BridgeIdentity::default();
/// assert_eq!(identity.serial_number(), "0017887ebe7d");
/// assert_eq!(identity.bridge_id(), "001788FFFE7ebe7d");
/// assert_eq!(identity.uuid(), "2f402f80-da50-11e1-9b23-0017887ebe7d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeIdentity {
    serial_number: String,
    bridge_id: String,
    uuid: String,
}

impl BridgeIdentity {
    /// Build an identity from a 12 character hex serial number.
    pub fn from_serial(serial: &str) -> crate::Result<Self> {
        if serial.len() != 12 || !serial.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(crate::DiscoveryError::InvalidSerial(serial.to_string()));
        }

        let (prefix, postfix) = serial.split_at(6);
        Ok(Self {
            serial_number: serial.to_string(),
            bridge_id: format!("{prefix}FFFE{postfix}"),
            uuid: format!("{UUID_NAMESPACE}{serial}"),
        })
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn bridge_id(&self) -> &str {
        &self.bridge_id
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// The UUID in `uuid:<uuid>` form used by UDN and USN fields.
    pub fn udn(&self) -> String {
        format!("uuid:{}", self.uuid)
    }
}

impl Default for BridgeIdentity {
    fn default() -> Self {
        let serial = format!("{SERIAL_PREFIX}{SERIAL_POSTFIX}");
        Self {
            bridge_id: format!("{SERIAL_PREFIX}FFFE{SERIAL_POSTFIX}"),
            uuid: format!("{UUID_NAMESPACE}{serial}"),
            serial_number: serial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_from_serial() {
        let from_serial = BridgeIdentity::from_serial("0017887ebe7d").unwrap();
        assert_eq!(BridgeIdentity::default(), from_serial);
    }

    #[test]
    fn test_udn() {
        assert_eq!(
            BridgeIdentity::default().udn(),
            "uuid:2f402f80-da50-11e1-9b23-0017887ebe7d"
        );
    }

    #[test]
    fn test_bridge_id_inserts_fffe_after_third_byte() {
        let identity = BridgeIdentity::from_serial("aabbccddeeff").unwrap();
        assert_eq!(identity.bridge_id(), "aabbccFFFEddeeff");
    }

    #[test]
    fn test_rejects_bad_serials() {
        assert!(BridgeIdentity::from_serial("").is_err());
        assert!(BridgeIdentity::from_serial("0017887ebe7").is_err());
        assert!(BridgeIdentity::from_serial("0017887ebe7z").is_err());
        assert!(BridgeIdentity::from_serial("0017887ebe7d00").is_err());
    }
}
