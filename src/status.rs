use std::net::IpAddr;
use std::time::Duration;

use rand::random;
use serde::Serialize;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tracing::debug;

/// Reachability of a device as seen from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceStatus {
    Reachable,
    Unreachable,
}

impl DeviceStatus {
    pub fn is_reachable(self) -> bool {
        matches!(self, DeviceStatus::Reachable)
    }
}

/// Probes a device with a single ICMP echo.
///
/// Every failure path collapses to [`DeviceStatus::Unreachable`]: failed
/// name resolution, no ICMP socket, timeout, or an error reply. The check
/// never returns an error to the caller and performs no retries.
pub struct StatusChecker {
    timeout: Duration,
}

impl StatusChecker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn check_status(&self, address: &str) -> DeviceStatus {
        let Some(ip) = resolve(address).await else {
            debug!(address, "Could not resolve address");
            return DeviceStatus::Unreachable;
        };

        let client = match Client::new(&Config::default()) {
            Ok(client) => client,
            Err(e) => {
                debug!(address, error = %e, "Could not open ICMP socket");
                return DeviceStatus::Unreachable;
            }
        };

        let mut pinger = client.pinger(ip, PingIdentifier(random())).await;
        pinger.timeout(self.timeout);

        match pinger.ping(PingSequence(0), &[]).await {
            Ok((_reply, rtt)) => {
                debug!(address, rtt_ms = rtt.as_millis() as u64, "Echo reply");
                DeviceStatus::Reachable
            }
            Err(e) => {
                debug!(address, error = %e, "Echo request failed");
                DeviceStatus::Unreachable
            }
        }
    }
}

/// Resolves a literal IP or a hostname. Resolution runs on a blocking
/// thread since `ToSocketAddrs` does synchronous DNS lookups.
async fn resolve(address: &str) -> Option<IpAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Some(ip);
    }

    let host_with_port = format!("{address}:0");
    tokio::task::spawn_blocking(move || {
        use std::net::ToSocketAddrs;
        host_with_port
            .to_socket_addrs()
            .ok()?
            .next()
            .map(|addr| addr.ip())
    })
    .await
    .ok()
    .flatten()
}
