//! Detection of the address advertised in discovery responses.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::error::{DiscoveryError, Result};

/// Find the IPv4 address to put into LOCATION and the description.
///
/// Interfaces are enumerated and the first non-loopback, non-unspecified
/// IPv4 address wins. When several qualify, the one the kernel would use
/// for outbound traffic is preferred; having no default route is fine.
pub fn detect_advertise_ip() -> Result<Ipv4Addr> {
    let interfaces = local_ip_address::list_afinet_netifas()
        .map_err(|e| DiscoveryError::NoAddress(format!("failed to list network interfaces: {e}")))?;

    let ip = select_advertise_ip(&interfaces, route_hint())?;
    tracing::debug!("Found ip address {}", ip);
    Ok(ip)
}

/// Choose the advertised address from `(interface name, address)` pairs.
///
/// Fails with [`DiscoveryError::NoAddress`] when no interface carries a
/// usable IPv4 address.
pub fn select_advertise_ip(interfaces: &[(String, IpAddr)], preferred: Option<Ipv4Addr>) -> Result<Ipv4Addr> {
    pick_advertisable(interfaces, preferred).ok_or_else(|| {
        let seen: Vec<String> = interfaces
            .iter()
            .map(|(name, ip)| format!("{name}={ip}"))
            .collect();
        DiscoveryError::NoAddress(format!("no non-loopback IPv4 interface among [{}]", seen.join(", ")))
    })
}

fn pick_advertisable(interfaces: &[(String, IpAddr)], preferred: Option<Ipv4Addr>) -> Option<Ipv4Addr> {
    let candidates: Vec<Ipv4Addr> = interfaces
        .iter()
        .filter_map(|(_, ip)| advertisable(*ip))
        .collect();

    preferred
        .filter(|ip| candidates.contains(ip))
        .or_else(|| candidates.first().copied())
}

/// Address of the interface holding the default route, if there is one.
///
/// A UDP socket is "connected" to a public address so the kernel picks the
/// outbound interface; no packet is sent.
fn route_hint() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    advertisable(socket.local_addr().ok()?.ip())
}

/// Accept only non-loopback, non-unspecified IPv4 addresses.
fn advertisable(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
        _ => None,
    }
}
