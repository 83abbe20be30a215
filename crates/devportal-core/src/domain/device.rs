//! Discovery inputs and outputs.
//!
//! A [`DeviceCandidate`] is what discovery hands back to the caller: a host
//! that either answered the developer server's health route or did not.  An
//! [`AdvertisedService`] is the raw material the advertisement phase produces
//! before any probe has confirmed that the developer server is really there.
//!
//! # Why two types? (for beginners)
//!
//! A phone advertising `_gsync._tcp` over mDNS only proves that the GrayJay
//! *sync* service is running.  The developer server on port 11337 is a
//! separate, optional feature.  Keeping the advertisement record distinct from
//! the candidate makes it impossible to hand out `available = true` without a
//! probe having set it.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// TCP port the GrayJay developer server listens on.
pub const DEV_SERVER_PORT: u16 = 11337;

/// DNS-SD service type advertised by GrayJay's sync service.
pub const SYNC_SERVICE_TYPE: &str = "_gsync._tcp.local.";

/// Well-known lab address probed during the priority phase.
pub const DEFAULT_DEV_HOST: &str = "100.100.1.57";

/// A host that discovery considered, with the verdict of its liveness probe.
///
/// Identity is `host:dev_port`; see [`DeviceCandidate::endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCandidate {
    /// Advertised instance name, when the candidate came from mDNS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Host name or dotted-quad address.
    pub host: String,
    /// Port of the advertised sync service, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_port: Option<u16>,
    /// Port of the developer server.
    pub dev_port: u16,
    /// Round-trip time of the successful probe, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// `true` only when a probe received 200 or 302 from the health route.
    pub available: bool,
}

impl DeviceCandidate {
    /// A candidate whose probe failed (or has not run yet).
    pub fn unavailable(host: impl Into<String>, dev_port: u16) -> Self {
        Self {
            name: None,
            host: host.into(),
            sync_port: None,
            dev_port,
            response_time_ms: None,
            available: false,
        }
    }

    /// A candidate confirmed by a probe that answered after `response_time`.
    pub fn verified(host: impl Into<String>, dev_port: u16, response_time: Duration) -> Self {
        Self {
            name: None,
            host: host.into(),
            sync_port: None,
            dev_port,
            response_time_ms: Some(response_time.as_millis() as u64),
            available: true,
        }
    }

    /// Copies the advertisement metadata (name and sync port) onto a probe
    /// result.  Liveness fields are left untouched.
    pub fn with_advertisement(mut self, name: Option<String>, sync_port: Option<u16>) -> Self {
        self.name = name;
        self.sync_port = sync_port;
        self
    }

    /// `host:dev_port`, the candidate's identity.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.dev_port)
    }
}

/// One service instance reported by an advertisement backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisedService {
    /// Bare instance name (e.g. `"Pixel 7"`); see [`instance_name`].
    pub name: String,
    /// The advertisement's default address: the SRV target host name.
    pub host_name: Option<String>,
    /// Every address the advertisement carried, in the order received.
    pub addresses: Vec<String>,
    /// Advertised service port.
    pub port: u16,
}

impl AdvertisedService {
    /// Picks the address to probe.
    ///
    /// The first numeric dotted-quad entry wins; otherwise the default
    /// address is used.  Empty strings never qualify.
    pub fn preferred_address(&self) -> Option<&str> {
        self.addresses
            .iter()
            .map(String::as_str)
            .find(|addr| addr.parse::<Ipv4Addr>().is_ok())
            .or_else(|| self.host_name.as_deref())
            .filter(|addr| !addr.is_empty())
    }

    /// Converts the advertisement into an unverified candidate for the
    /// developer server port, or `None` if it has no usable address.
    pub fn into_candidate(self) -> Option<DeviceCandidate> {
        let host = self.preferred_address()?.to_string();
        Some(
            DeviceCandidate::unavailable(host, DEV_SERVER_PORT)
                .with_advertisement(Some(self.name), Some(self.port)),
        )
    }
}

/// Strips the `.<service_type>` suffix from a full DNS-SD instance name.
///
/// The suffix match ignores ASCII case and trailing dots.  A name without
/// the suffix is returned with its trailing dot trimmed.
///
/// ```
/// use devportal_core::instance_name;
///
/// assert_eq!(instance_name("Pixel 7._gsync._tcp.local.", "_gsync._tcp.local."), "Pixel 7");
/// assert_eq!(instance_name("Pixel._GSYNC._tcp.local", "_gsync._tcp.local."), "Pixel");
/// ```
pub fn instance_name(full_name: &str, service_type: &str) -> String {
    let full = full_name.trim_end_matches('.');
    let ty = service_type.trim_end_matches('.');
    let Some(split) = full.len().checked_sub(ty.len() + 1) else {
        return full.to_string();
    };
    match (full.get(..split), full.get(split..)) {
        (Some(instance), Some(suffix))
            if !instance.is_empty()
                && suffix.starts_with('.')
                && suffix[1..].eq_ignore_ascii_case(ty) =>
        {
            instance.to_string()
        }
        _ => full.to_string(),
    }
}

/// Discovery settings.
///
/// `timeout` is the caller's knob.  It feeds two derived values that keep
/// separate defaults: the advertisement browse window and the per-probe
/// timeout of the priority and sweep phases.  Re-verification of advertised
/// hosts uses its own `verify_timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Caller-supplied discovery timeout.
    pub timeout: Option<Duration>,
    /// Skip the advertisement phase.
    pub skip_advertisement: bool,
    /// Go straight to network probing (also skips advertisement).
    pub force_sweep: bool,
    /// Probe timeout used to re-verify advertised hosts.
    pub verify_timeout: Duration,
}

impl DiscoveryConfig {
    /// Browse window when `timeout` is unset.
    pub const DEFAULT_ADVERTISEMENT_WINDOW: Duration = Duration::from_millis(3000);
    /// Priority/sweep probe timeout when `timeout` is unset.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);
    /// Default re-verification timeout.
    pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_millis(2000);

    /// How long advertisement backends collect responses.
    pub fn advertisement_window(&self) -> Duration {
        self.timeout.unwrap_or(Self::DEFAULT_ADVERTISEMENT_WINDOW)
    }

    /// Timeout for each priority-host and sweep probe.
    pub fn probe_timeout(&self) -> Duration {
        self.timeout.unwrap_or(Self::DEFAULT_PROBE_TIMEOUT)
    }

    /// Whether the advertisement phase runs at all.
    pub fn uses_advertisement(&self) -> bool {
        !self.skip_advertisement && !self.force_sweep
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            skip_advertisement: false,
            force_sweep: false,
            verify_timeout: Self::DEFAULT_VERIFY_TIMEOUT,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
