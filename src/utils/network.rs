//! Network utilities
//!
//! Provides network-related utility functions.

use std::net::{IpAddr, Ipv4Addr};
use tokio::net::UdpSocket;

/// Probe target for local address discovery. Connecting a UDP socket sends
/// no packets; it only makes the OS pick the outbound interface.
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Best-effort IPv4 address of this host on the local network.
///
/// Falls back to `127.0.0.1` when no route is available.
pub async fn get_local_ip() -> String {
    discover_local_ip()
        .await
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .to_string()
}

async fn discover_local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await.ok()?;
    socket.connect(PROBE_ADDR).await.ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_ip_is_always_an_ipv4_address() {
        let ip: Ipv4Addr = get_local_ip().await.parse().unwrap();
        assert!(!ip.is_unspecified());
    }
}
