//! DiscoveryEngine: find developer servers on the local network.
//!
//! # Passes
//!
//! ```text
//! advertisement ──(verified ≥ 1)──► return
//!      │ none
//!      ▼
//! priority hosts ──(available ≥ 1)──► return
//!      │ none
//!      ▼
//! /24 sweep, 25 at a time ──► return whatever answered
//! ```
//!
//! 1. **Advertisement** – browse `_gsync._tcp.local.` and re-probe every
//!    advertised host on port 11337.  Advertisement alone proves only that
//!    the sync service runs, so unverified hosts are never returned.
//! 2. **Priority hosts** – `localhost`, `127.0.0.1`, the well-known lab
//!    address, and the machine's own IPv4 addresses, all probed at once.
//! 3. **Sweep** – every host of the first local address's /24, in batches
//!    of [`SWEEP_BATCH_SIZE`].  Each batch completes before the next starts.
//!
//! Passes 2 and 3 need a local IPv4 address.  Without one, discovery ends
//! after the advertisement pass.
//!
//! Results keep probe submission order.  The engine keeps nothing between
//! calls, and it never fails: an empty list means nothing was found.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use devportal_core::{
    sweep_hosts, DeviceCandidate, DiscoveryConfig, DEFAULT_DEV_HOST, DEV_SERVER_PORT,
    SWEEP_BATCH_SIZE, SYNC_SERVICE_TYPE,
};
use futures_util::future::join_all;
use tracing::{debug, info};

use crate::infrastructure::advertisement::{
    browse_first_available, default_backends, AdvertisementBackend,
};
use crate::infrastructure::interfaces::{InterfaceProvider, SystemInterfaces};
use crate::infrastructure::probe::{HostProbe, HttpHostProbe};

/// Hosts probed in the priority pass, in order.  Duplicates are dropped.
pub fn priority_hosts(local: &[Ipv4Addr]) -> Vec<String> {
    let mut hosts: Vec<String> = ["localhost", "127.0.0.1", DEFAULT_DEV_HOST]
        .iter()
        .map(|h| h.to_string())
        .collect();
    for ip in local {
        let ip = ip.to_string();
        if !hosts.contains(&ip) {
            hosts.push(ip);
        }
    }
    hosts
}

/// Three-pass discovery over injected collaborators.
pub struct DiscoveryEngine {
    probe: Arc<dyn HostProbe>,
    backends: Vec<Box<dyn AdvertisementBackend>>,
    interfaces: Box<dyn InterfaceProvider>,
}

impl DiscoveryEngine {
    pub fn new(
        probe: Arc<dyn HostProbe>,
        backends: Vec<Box<dyn AdvertisementBackend>>,
        interfaces: Box<dyn InterfaceProvider>,
    ) -> Self {
        Self {
            probe,
            backends,
            interfaces,
        }
    }

    /// Engine wired to the real network: HTTP probes, both advertisement
    /// backends, and the OS interface table.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the HTTP client cannot be built.
    pub fn system() -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Arc::new(HttpHostProbe::new()?),
            default_backends(),
            Box::new(SystemInterfaces),
        ))
    }

    /// Runs the passes in order and returns the first non-empty result.
    pub async fn discover(&self, config: &DiscoveryConfig) -> Vec<DeviceCandidate> {
        if config.uses_advertisement() {
            let verified = self.advertised(config).await;
            if !verified.is_empty() {
                info!("found {} device(s) via advertisement", verified.len());
                return verified;
            }
            info!("no verified advertised device; probing likely hosts");
        }

        let local = self.interfaces.local_ipv4_addrs();
        let Some(&first) = local.first() else {
            info!("no local IPv4 address; skipping network probing");
            return Vec::new();
        };
        let timeout = config.probe_timeout();

        let priority = self.probe_all(&priority_hosts(&local), timeout).await;
        if !priority.is_empty() {
            info!("found {} device(s) on priority hosts", priority.len());
            return priority;
        }

        info!("sweeping {first}/24");
        let swept = self.sweep(first, timeout).await;
        info!("sweep found {} device(s)", swept.len());
        swept
    }

    /// Advertised hosts that answered the re-verification probe.
    async fn advertised(&self, config: &DiscoveryConfig) -> Vec<DeviceCandidate> {
        let services = browse_first_available(
            &self.backends,
            SYNC_SERVICE_TYPE,
            config.advertisement_window(),
        )
        .await;

        let candidates: Vec<DeviceCandidate> = services
            .into_iter()
            .filter_map(|service| {
                let name = service.name.clone();
                let candidate = service.into_candidate();
                if candidate.is_none() {
                    debug!("dropping {name}: no usable address");
                }
                candidate
            })
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        debug!("verifying {} advertised host(s)", candidates.len());

        let checks = candidates.into_iter().map(|candidate| async move {
            self.probe
                .probe(&candidate.host, candidate.dev_port, config.verify_timeout)
                .await
                .with_advertisement(candidate.name, candidate.sync_port)
        });
        join_all(checks)
            .await
            .into_iter()
            .filter(|c| c.available)
            .collect()
    }

    /// Probes every host at once and keeps the available ones.
    async fn probe_all(&self, hosts: &[String], timeout: Duration) -> Vec<DeviceCandidate> {
        let probes = hosts
            .iter()
            .map(|host| self.probe.probe(host, DEV_SERVER_PORT, timeout));
        join_all(probes)
            .await
            .into_iter()
            .filter(|c| c.available)
            .collect()
    }

    async fn sweep(&self, local: Ipv4Addr, timeout: Duration) -> Vec<DeviceCandidate> {
        let hosts: Vec<String> = sweep_hosts(local).iter().map(|ip| ip.to_string()).collect();
        let mut found = Vec::new();
        for batch in hosts.chunks(SWEEP_BATCH_SIZE) {
            found.extend(self.probe_all(batch, timeout).await);
        }
        found
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
