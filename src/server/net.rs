// src/server/net.rs

use std::net::{IpAddr, Ipv4Addr};

use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Host value that asks for the machine's outward-facing address.
pub const AUTO_HOST: &str = "auto";

/// Turn the configured host into an address to bind.
///
/// `"auto"` resolves to the address of the interface used for outbound
/// traffic, falling back to loopback when there is none. Anything else is
/// returned unchanged.
pub async fn resolve_bind_host(host: &str) -> String {
    if !host.eq_ignore_ascii_case(AUTO_HOST) {
        return host.to_string();
    }

    match outbound_address().await {
        Ok(ip) => {
            debug!(%ip, "resolved local address");
            ip.to_string()
        }
        Err(e) => {
            warn!(error = %e, "could not determine local address; using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST).to_string()
        }
    }
}

/// Connecting a UDP socket sends nothing; it only selects the route, which
/// tells us the local address.
async fn outbound_address() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).await?;
    Ok(socket.local_addr()?.ip())
}

