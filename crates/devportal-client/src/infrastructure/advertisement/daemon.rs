//! Primary advertisement backend: the `mdns-sd` daemon.
//!
//! The daemon runs its own thread and delivers events over a blocking
//! channel, so the receive loop lives on tokio's blocking pool.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use devportal_core::{instance_name, AdvertisedService};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use tracing::{debug, trace};

use super::{AdvertisementBackend, AdvertisementError};

const BACKEND: &str = "mdns-sd";

/// Browses through a per-call [`ServiceDaemon`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MdnsSdBackend;

impl MdnsSdBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AdvertisementBackend for MdnsSdBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn browse(
        &self,
        service_type: &str,
        window: Duration,
    ) -> Result<Vec<AdvertisedService>, AdvertisementError> {
        let daemon =
            ServiceDaemon::new().map_err(|e| AdvertisementError::unavailable(BACKEND, e))?;
        let receiver = match daemon.browse(service_type) {
            Ok(receiver) => receiver,
            Err(e) => {
                if let Err(shutdown) = daemon.shutdown() {
                    trace!("daemon shutdown failed: {shutdown}");
                }
                return Err(AdvertisementError::unavailable(BACKEND, e));
            }
        };

        let ty = service_type.to_string();
        let collected = tokio::task::spawn_blocking(move || {
            let deadline = Instant::now() + window;
            let mut seen = HashSet::new();
            let mut services = Vec::new();

            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match receiver.recv_timeout(remaining) {
                    Ok(ServiceEvent::ServiceResolved(info)) => {
                        if seen.insert(info.get_fullname().to_string()) {
                            let service = to_advertised(&info, &ty);
                            debug!(
                                "resolved {} -> {:?}:{}",
                                service.name, service.addresses, service.port
                            );
                            services.push(service);
                        }
                    }
                    Ok(other) => trace!("mdns event: {other:?}"),
                    // Timeout or the daemon went away: either way the window is over.
                    Err(_) => break,
                }
            }

            if let Err(e) = daemon.stop_browse(&ty) {
                trace!("stop_browse failed: {e}");
            }
            if let Err(e) = daemon.shutdown() {
                trace!("daemon shutdown failed: {e}");
            }
            services
        })
        .await
        .map_err(|e| AdvertisementError::unavailable(BACKEND, e))?;

        Ok(collected)
    }
}

fn to_advertised(info: &ServiceInfo, service_type: &str) -> AdvertisedService {
    let mut addresses: Vec<String> = info.get_addresses().iter().map(|a| a.to_string()).collect();
    addresses.sort();
    let host_name = Some(info.get_hostname().to_string()).filter(|h| !h.is_empty());
    AdvertisedService {
        name: instance_name(info.get_fullname(), service_type),
        host_name,
        addresses,
        port: info.get_port(),
    }
}
