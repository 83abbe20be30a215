//! Domain layer: pure types with no I/O.
//!
//! - `device` – discovery inputs and outputs.
//! - `outcome` – the `RpcOutcome` envelope returned by call-shaped operations.
//! - `plugin` – plugin descriptors and developer log entries.
//! - `subnet` – /24 enumeration used by the subnet sweep.

pub mod device;
pub mod outcome;
pub mod plugin;
pub mod subnet;
