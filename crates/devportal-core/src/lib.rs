//! # devportal-core
//!
//! Shared library for the GrayJay developer portal client containing the
//! domain model, the developer server's route table, and the rules that turn
//! its loosely shaped JSON responses into a uniform result contract.
//!
//! This crate performs no I/O.  It has no dependency on sockets, HTTP
//! clients, or the async runtime, which keeps every rule here testable with
//! plain values.
//!
//! # Architecture overview (for beginners)
//!
//! The GrayJay app can run a small HTTP "developer server" on port 11337.
//! A plugin author's tool finds that server on the LAN, pushes a plugin to it,
//! and then calls plugin methods remotely to test them.
//!
//! - **`domain`** – What the tool talks about: device candidates produced by
//!   discovery, discovery settings, plugin descriptors, developer log entries,
//!   the `RpcOutcome` envelope, and /24 subnet arithmetic for the sweep.
//!
//! - **`protocol`** – How the developer server is addressed and how its
//!   answers are read: the fixed route table and the envelope
//!   disambiguation rules (`{error}` vs `{result}` vs bare body).

pub mod domain;
pub mod protocol;

pub use domain::device::{
    instance_name, AdvertisedService, DeviceCandidate, DiscoveryConfig, DEFAULT_DEV_HOST,
    DEV_SERVER_PORT, SYNC_SERVICE_TYPE,
};
pub use domain::outcome::RpcOutcome;
pub use domain::plugin::{DevLog, PluginConfig, PluginConfigError};
pub use domain::subnet::{sweep_hosts, SWEEP_BATCH_SIZE};
pub use protocol::envelope::{disambiguate, login_state_from_body, logs_from_body};
