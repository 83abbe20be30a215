//! /24 subnet enumeration for the last-resort sweep.
//!
//! The sweep treats the first local IPv4 address as the representative of a
//! /24 network and visits every host suffix `1..=254`.  `.0` (network) and
//! `.255` (broadcast) are never probed.

use std::net::Ipv4Addr;

/// Number of probes the sweep keeps in flight at once.
pub const SWEEP_BATCH_SIZE: usize = 25;

/// Returns the 254 host addresses of the /24 that contains `local`.
///
/// # Example
///
/// ```rust
/// use std::net::Ipv4Addr;
/// use devportal_core::sweep_hosts;
///
/// let hosts = sweep_hosts(Ipv4Addr::new(192, 168, 1, 42));
/// assert_eq!(hosts.len(), 254);
/// assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 1, 1));
/// ```
pub fn sweep_hosts(local: Ipv4Addr) -> Vec<Ipv4Addr> {
    let [a, b, c, _] = local.octets();
    (1..=254u8).map(|d| Ipv4Addr::new(a, b, c, d)).collect()
}
