//! Minimal SSDP client for checking what the responder advertises.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::error::Result;
use crate::ssdp::{self, SearchResponse, SSDP_MULTICAST_ADDR, SSDP_PORT};

/// Build an M-SEARCH request for `search_target`.
pub fn search_request(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {SSDP_MULTICAST_ADDR}:{SSDP_PORT}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 2\r\n\
         ST: {search_target}\r\n\
         USER-AGENT: hue-emulator/1.0 UPnP/1.0\r\n\
         \r\n"
    )
}

/// Send one M-SEARCH to `target` and collect responses until `timeout`
/// passes without a new datagram.
///
/// Datagrams that are not valid UTF-8 or lack the required headers are
/// skipped.
pub async fn probe(target: SocketAddr, search_target: &str, timeout: Duration) -> Result<Vec<SearchResponse>> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_multicast_loop_v4(true)?;
    socket
        .send_to(search_request(search_target).as_bytes(), target)
        .await?;

    let mut responses = Vec::new();
    let mut buffer = [0u8; 2048];
    while let Ok(received) = tokio::time::timeout(timeout, socket.recv_from(&mut buffer)).await {
        let (size, _) = received?;
        let Ok(text) = std::str::from_utf8(&buffer[..size]) else {
            continue;
        };
        if let Some(response) = ssdp::parse_search_response(text) {
            responses.push(response);
        }
    }

    Ok(responses)
}

/// Probe the standard multicast group.
pub async fn probe_multicast(timeout: Duration) -> Result<Vec<SearchResponse>> {
    probe(
        SocketAddr::from((SSDP_MULTICAST_ADDR, SSDP_PORT)),
        "ssdp:all",
        timeout,
    )
    .await
}
