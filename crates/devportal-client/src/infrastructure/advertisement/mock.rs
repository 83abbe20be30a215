//! Fixed-answer advertisement backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use devportal_core::AdvertisedService;

use super::{AdvertisementBackend, AdvertisementError};

/// An [`AdvertisementBackend`] that returns a fixed answer immediately.
pub struct StaticAdvertisement {
    name: &'static str,
    answer: Option<Vec<AdvertisedService>>,
    browses: AtomicUsize,
}

impl StaticAdvertisement {
    /// A backend that is available and reports `services`.
    pub fn with_services(services: Vec<AdvertisedService>) -> Self {
        Self {
            name: "static",
            answer: Some(services),
            browses: AtomicUsize::new(0),
        }
    }

    /// A backend that is available but sees nothing.
    pub fn empty() -> Self {
        Self::with_services(Vec::new())
    }

    /// A backend that always reports itself unavailable.
    pub fn unavailable() -> Self {
        Self {
            name: "static-unavailable",
            answer: None,
            browses: AtomicUsize::new(0),
        }
    }

    /// Number of times `browse` was called.
    pub fn browse_count(&self) -> usize {
        self.browses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvertisementBackend for StaticAdvertisement {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn browse(
        &self,
        _service_type: &str,
        _window: Duration,
    ) -> Result<Vec<AdvertisedService>, AdvertisementError> {
        self.browses.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| AdvertisementError::unavailable(self.name, "scripted"))
    }
}
