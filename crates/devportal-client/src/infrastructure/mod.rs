//! Infrastructure layer for the developer portal client.
//!
//! Contains the adapters that touch the outside world.
//!
//! **Dependency rule**: this layer may depend on `devportal_core`, but the
//! application layer only sees it through the traits defined here
//! (`HostProbe`, `AdvertisementBackend`, `InterfaceProvider`).
//!
//! # Sub-modules
//!
//! - **`probe`** – One bounded HTTP GET against the health route.  A
//!   `ScriptedProbe` fake is provided for tests.
//!
//! - **`advertisement`** – DNS-SD browsing for `_gsync._tcp`, with a primary
//!   backend (`mdns-sd` daemon) and a secondary one-shot multicast query.
//!
//! - **`interfaces`** – Local non-loopback IPv4 addresses.
//!
//! - **`rpc`** – HTTP primitives and the typed developer server client.
//!
//! - **`storage`** – TOML configuration for the `devportal` binary.

pub mod advertisement;
pub mod interfaces;
pub mod probe;
pub mod rpc;
pub mod storage;
