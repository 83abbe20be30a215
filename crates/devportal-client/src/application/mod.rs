//! Application layer use cases.
//!
//! - **`discover_devices`** – The three-pass discovery state machine
//!   (advertisement → priority hosts → subnet sweep).  Every collaborator
//!   (probe, advertisement backends, interface lookup) is injected so the
//!   state machine can be tested without a network.
//!
//! - **`connect`** – Runs discovery and binds a `DevPortalClient` to the
//!   first device found.

pub mod connect;
pub mod discover_devices;
