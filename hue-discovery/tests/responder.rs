//! Integration tests for the discovery responder.
//!
//! These bind a real UDP socket on an ephemeral port and talk to it over
//! loopback.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use hue_discovery::{probe, ssdp, BridgeIdentity, DiscoveryResponder, ResponderConfig};
use tokio::net::UdpSocket;

const HTTP_PORT: u16 = 8123;

async fn start_responder() -> (DiscoveryResponder, SocketAddr) {
    let location = ssdp::location_url(Ipv4Addr::new(192, 168, 1, 20), HTTP_PORT);
    let config = ResponderConfig::new(BridgeIdentity::default(), location).with_port(0);
    let responder = DiscoveryResponder::bind(config)
        .await
        .expect("Failed to bind responder");
    let target = SocketAddr::from((Ipv4Addr::LOCALHOST, responder.local_addr().port()));
    (responder, target)
}

#[tokio::test]
async fn test_m_search_gets_three_responses() {
    let (responder, target) = start_responder().await;

    let responses = probe::probe(target, "ssdp:all", Duration::from_millis(500))
        .await
        .expect("Probe failed");

    assert_eq!(responses.len(), 3);
    let identity = BridgeIdentity::default();
    let targets = ssdp::search_targets(&identity);
    for (response, target) in responses.iter().zip(targets.iter()) {
        assert!(response.location.contains(&format!(":{HTTP_PORT}/")));
        assert_eq!(response.bridge_id.as_deref(), Some("001788FFFE7ebe7d"));
        assert_eq!(&response.st, &target.st);
        assert_eq!(&response.usn, &target.usn);
    }

    responder.shutdown().await;
}

#[tokio::test]
async fn test_non_search_datagram_is_ignored() {
    let (responder, target) = start_responder().await;

    let client = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    client
        .send_to(b"NOTIFY * HTTP/1.1\r\nNTS: ssdp:alive\r\n\r\n", target)
        .await
        .unwrap();

    let mut buffer = [0u8; 2048];
    let received = tokio::time::timeout(Duration::from_millis(300), client.recv_from(&mut buffer)).await;
    assert!(received.is_err(), "Responder must not answer non-search datagrams");

    responder.shutdown().await;
}

#[tokio::test]
async fn test_each_search_is_answered() {
    let (responder, target) = start_responder().await;

    let client = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let request = probe::search_request("upnp:rootdevice");
    client.send_to(request.as_bytes(), target).await.unwrap();
    client.send_to(request.as_bytes(), target).await.unwrap();

    let mut count = 0;
    let mut buffer = [0u8; 2048];
    while let Ok(Ok((size, _))) =
        tokio::time::timeout(Duration::from_millis(300), client.recv_from(&mut buffer)).await
    {
        let text = std::str::from_utf8(&buffer[..size]).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        count += 1;
    }
    assert_eq!(count, 6);

    responder.shutdown().await;
}
