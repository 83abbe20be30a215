//! devportal-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does devportal-client do? (for beginners)
//!
//! GrayJay's developer server lets a plugin author push a plugin onto a
//! phone (or desktop build) and call the plugin's methods remotely.  The
//! server listens on port 11337, but the author usually does not know the
//! device's IP address.  This crate:
//!
//! 1. Finds the device: mDNS advertisement first, then a handful of likely
//!    hosts, then a sweep of the local /24 network.
//! 2. Talks to it: a typed client over the developer server's HTTP routes
//!    that hides the server's quirks (mixed status codes, ambiguous response
//!    envelopes, connections that are closed instead of answered).
//!
//! ```text
//! caller
//!  ├─ application::discover_devices::DiscoveryEngine  → Vec<DeviceCandidate>
//!  └─ infrastructure::rpc::DevPortalClient            → RpcOutcome / values
//! ```

/// Application layer: discovery orchestration and client composition.
pub mod application;

/// Infrastructure layer: HTTP, mDNS, network interfaces, and configuration.
pub mod infrastructure;

pub use application::connect::{connect_discovered, ConnectError};
pub use application::discover_devices::DiscoveryEngine;
pub use infrastructure::rpc::{DevPortalClient, RpcError, RpcTarget, RpcTimeouts};
