//! SSDP message formats used by the discovery responder.
//!
//! The responder only classifies inbound datagrams (does it contain
//! `M-SEARCH`?) and renders the three search responses a hue bridge sends.
//! The parser at the bottom reads those responses back and is used by the
//! probe client.

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::identity::BridgeIdentity;

/// SSDP multicast group.
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
/// SSDP port.
pub const SSDP_PORT: u16 = 1900;
/// Path of the description document referenced by LOCATION.
pub const DESCRIPTION_PATH: &str = "/description.xml";
/// SERVER header value of a real bridge.
pub const SERVER_STRING: &str = "Linux/3.14.0 UPnP/1.0 IpBridge/1.29.0";
/// Search target for the basic device type.
pub const BASIC_DEVICE_URN: &str = "urn:schemas-upnp-org:device:basic:1";
/// Search target for root devices.
pub const ROOT_DEVICE: &str = "upnp:rootdevice";

const SEARCH_TOKEN: &[u8] = b"M-SEARCH";

/// Whether a datagram is a discovery request.
///
/// Only the presence of `M-SEARCH` is checked, anywhere in the payload.
pub fn is_search_request(datagram: &[u8]) -> bool {
    datagram
        .windows(SEARCH_TOKEN.len())
        .any(|window| window == SEARCH_TOKEN)
}

/// One (search target, unique service name) pair answered by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub st: String,
    pub usn: String,
}

/// The three search targets answered for every M-SEARCH, in send order.
pub fn search_targets(identity: &BridgeIdentity) -> [SearchTarget; 3] {
    let udn = identity.udn();
    [
        SearchTarget {
            st: ROOT_DEVICE.to_string(),
            usn: format!("{udn}::{ROOT_DEVICE}"),
        },
        SearchTarget {
            st: udn.clone(),
            usn: udn.clone(),
        },
        SearchTarget {
            st: BASIC_DEVICE_URN.to_string(),
            usn: udn,
        },
    ]
}

/// LOCATION URL for a bridge reachable at `ip:port`.
pub fn location_url(ip: Ipv4Addr, port: u16) -> String {
    format!("http://{ip}:{port}{DESCRIPTION_PATH}")
}

/// Render a search response datagram.
pub fn render_response(location: &str, bridge_id: &str, target: &SearchTarget) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         HOST: {SSDP_MULTICAST_ADDR}:{SSDP_PORT}\r\n\
         EXT:\r\n\
         CACHE-CONTROL: max-age=100\r\n\
         LOCATION: {location}\r\n\
         SERVER: {SERVER_STRING}\r\n\
         hue-bridgeid: {bridge_id}\r\n\
         ST: {st}\r\n\
         USN: {usn}\r\n\
         \r\n",
        st = target.st,
        usn = target.usn,
    )
}

/// Render all three responses for `identity`, in send order.
pub fn render_responses(identity: &BridgeIdentity, location: &str) -> Vec<String> {
    search_targets(identity)
        .iter()
        .map(|target| render_response(location, identity.bridge_id(), target))
        .collect()
}

/// A search response as seen by a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub location: String,
    pub st: String,
    pub usn: String,
    pub server: Option<String>,
    pub bridge_id: Option<String>,
}

/// Parse a search response from HTTP text.
///
/// Returns `None` unless LOCATION, ST and USN are all present.
pub fn parse_search_response(response: &str) -> Option<SearchResponse> {
    let mut location = None;
    let mut st = None;
    let mut usn = None;
    let mut server = None;
    let mut bridge_id = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            st = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        } else if let Some(value) = extract_header_value(line, "hue-bridgeid:") {
            bridge_id = Some(value);
        }
    }

    match (location, st, usn) {
        (Some(location), Some(st), Some(usn)) => Some(SearchResponse {
            location,
            st,
            usn,
            server,
            bridge_id,
        }),
        _ => None,
    }
}

/// Extract header value from a line like "HEADER: value"
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len() && line[..header.len()].eq_ignore_ascii_case(header) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}
