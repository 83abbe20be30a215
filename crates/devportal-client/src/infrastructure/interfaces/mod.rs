//! Local network interface lookup.

use std::net::{IpAddr, Ipv4Addr};

use tracing::warn;

/// Source of the host's own IPv4 addresses.
#[cfg_attr(test, mockall::automock)]
pub trait InterfaceProvider: Send + Sync {
    /// Non-loopback IPv4 addresses, in the order the OS reports them.
    fn local_ipv4_addrs(&self) -> Vec<Ipv4Addr>;
}

/// [`InterfaceProvider`] reading the OS interface table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceProvider for SystemInterfaces {
    fn local_ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        let interfaces = match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!("cannot list network interfaces: {e}");
                return Vec::new();
            }
        };
        let mut addrs = Vec::new();
        for iface in interfaces.iter().filter(|i| !i.is_loopback()) {
            if let IpAddr::V4(v4) = iface.ip() {
                if !v4.is_loopback() && !addrs.contains(&v4) {
                    addrs.push(v4);
                }
            }
        }
        addrs
    }
}

/// Fixed address list, for tests and for pinning discovery to one network.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticInterfaces(pub Vec<Ipv4Addr>);

impl InterfaceProvider for StaticInterfaces {
    fn local_ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        self.0.clone()
    }
}
