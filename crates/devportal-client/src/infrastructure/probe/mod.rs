//! Liveness probing of the developer server's health route.
//!
//! A probe is one bounded `GET /dev`.  It never fails: whatever goes wrong
//! (refused connection, DNS failure, unexpected status, timeout) the caller
//! gets back a [`DeviceCandidate`] with `available = false`.
//!
//! # Socket hygiene
//!
//! A subnet sweep fires hundreds of probes.  The HTTP client is built with
//! an idle pool size of zero, so the connection behind a probe is closed as
//! soon as its response is dropped, which happens right after the status line
//! has been inspected.  Redirects are not followed: a 302 already proves the
//! server is there.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use devportal_core::{protocol::routes, DeviceCandidate};
use reqwest::{redirect::Policy, Client, StatusCode};
use tracing::{debug, trace};

pub mod mock;

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("devportal-client/", env!("CARGO_PKG_VERSION"));

/// Returns `true` for the statuses the health route answers with when the
/// developer server is running.
pub fn is_alive_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::FOUND
}

/// Trait abstracting a single liveness probe.
///
/// The production implementation is [`HttpHostProbe`]; tests use
/// [`mock::ScriptedProbe`].
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Probes `host:port` once, giving up after `timeout`.
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> DeviceCandidate;
}

/// [`HostProbe`] backed by a real HTTP client.
#[derive(Debug, Clone)]
pub struct HttpHostProbe {
    client: Client,
}

impl HttpHostProbe {
    /// Creates a probe with redirects disabled and no connection pooling.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the HTTP client cannot be built
    /// (e.g. the system resolver configuration cannot be loaded).
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HostProbe for HttpHostProbe {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> DeviceCandidate {
        let url = format!("http://{host}:{port}{}", routes::HEALTH);
        let started = Instant::now();

        // The outer timeout bounds DNS resolution and connect as well as the
        // response head.
        let result = tokio::time::timeout(timeout, self.client.get(&url).send()).await;
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(response)) if is_alive_status(response.status()) => {
                debug!(
                    "probe {host}:{port} alive ({}) in {}ms",
                    response.status(),
                    elapsed.as_millis()
                );
                DeviceCandidate::verified(host, port, elapsed)
            }
            Ok(Ok(response)) => {
                debug!("probe {host}:{port} answered {}", response.status());
                DeviceCandidate::unavailable(host, port)
            }
            Ok(Err(e)) => {
                trace!("probe {host}:{port} failed: {e}");
                DeviceCandidate::unavailable(host, port)
            }
            Err(_) => {
                trace!("probe {host}:{port} timed out after {}ms", timeout.as_millis());
                DeviceCandidate::unavailable(host, port)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
