//! DNS-SD service advertisement lookup.
//!
//! GrayJay advertises its sync service as `_gsync._tcp.local.`.  Discovery
//! browses for it and treats every answer as a *candidate* that still has to
//! be probed.
//!
//! # Backends
//!
//! Two backends are tried in order:
//!
//! 1. [`daemon::MdnsSdBackend`] – a full mDNS responder/browser daemon.  It
//!    needs to join the multicast group on port 5353, which fails when
//!    another responder holds the port exclusively or multicast is disabled.
//! 2. [`multicast_query::MulticastQueryBackend`] – sends a single DNS-SD
//!    query from an ephemeral port and reads unicast replies.  It needs no
//!    privileged port and no daemon thread.
//!
//! The first backend that is *available* supplies the answer, even if it
//! found nothing.  Unavailability of every backend yields an empty list; it
//! is never a discovery error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devportal_core::AdvertisedService;
use thiserror::Error;
use tracing::{debug, warn};

pub mod daemon;
pub mod mock;
pub mod multicast_query;

/// Error type for advertisement backends.
#[derive(Debug, Error)]
pub enum AdvertisementError {
    /// The backend cannot run on this host right now.
    #[error("advertisement backend `{backend}` unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },
}

impl AdvertisementError {
    pub(crate) fn unavailable(backend: &'static str, reason: impl ToString) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

/// Trait abstracting a service-advertisement lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdvertisementBackend: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Collects services of `service_type` seen within `window`.
    ///
    /// # Errors
    ///
    /// Returns [`AdvertisementError::Unavailable`] when the backend cannot
    /// run at all.  Finding nothing is `Ok(vec![])`.
    async fn browse(
        &self,
        service_type: &str,
        window: Duration,
    ) -> Result<Vec<AdvertisedService>, AdvertisementError>;
}

/// Lets callers keep a handle on a backend they hand to the engine.
#[async_trait]
impl<T: AdvertisementBackend + ?Sized> AdvertisementBackend for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn browse(
        &self,
        service_type: &str,
        window: Duration,
    ) -> Result<Vec<AdvertisedService>, AdvertisementError> {
        (**self).browse(service_type, window).await
    }
}

/// The production backends, primary first.
pub fn default_backends() -> Vec<Box<dyn AdvertisementBackend>> {
    vec![
        Box::new(daemon::MdnsSdBackend::new()),
        Box::new(multicast_query::MulticastQueryBackend::new()),
    ]
}

/// Browses with the first available backend.
pub async fn browse_first_available(
    backends: &[Box<dyn AdvertisementBackend>],
    service_type: &str,
    window: Duration,
) -> Vec<AdvertisedService> {
    for backend in backends {
        match backend.browse(service_type, window).await {
            Ok(services) => {
                debug!(
                    "advertisement backend `{}` returned {} service(s)",
                    backend.name(),
                    services.len()
                );
                return services;
            }
            Err(e) => warn!("{e}; trying next backend"),
        }
    }
    debug!("no advertisement backend available");
    Vec::new()
}
