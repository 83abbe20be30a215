//! Scripted probe for testing discovery without a network.
//!
//! A [`ScriptedProbe`] answers "alive" for a fixed set of endpoints and
//! "unavailable" for everything else.  It records every call and tracks how
//! many probes were in flight at once, so tests can assert on ordering,
//! call counts, and the sweep's concurrency cap.

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use devportal_core::DeviceCandidate;

use super::HostProbe;

/// One recorded probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCall {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

/// A fake [`HostProbe`] with a fixed set of live endpoints.
pub struct ScriptedProbe {
    live: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<ProbeCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProbe {
    /// Creates a probe where nothing answers.  Each probe takes 5 ms so that
    /// concurrent probes overlap.
    pub fn new() -> Self {
        Self {
            live: HashSet::new(),
            delay: Duration::from_millis(5),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Marks `host:port` as answering 200.
    pub fn with_live(mut self, host: &str, port: u16) -> Self {
        self.live.insert(format!("{host}:{port}"));
        self
    }

    /// Overrides the simulated probe latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call made so far, in the order probes started.
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if `host` was probed on any port.
    pub fn was_probed(&self, host: &str) -> bool {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|c| c.host == host)
    }

    /// Highest number of probes that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostProbe for ScriptedProbe {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> DeviceCandidate {
        self.calls.lock().expect("lock poisoned").push(ProbeCall {
            host: host.to_string(),
            port,
            timeout,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.live.contains(&format!("{host}:{port}")) {
            DeviceCandidate::verified(host, port, self.delay)
        } else {
            DeviceCandidate::unavailable(host, port)
        }
    }
}
