//! Discovery plus client construction in one step.

use devportal_core::DiscoveryConfig;
use thiserror::Error;
use tracing::info;

use super::discover_devices::DiscoveryEngine;
use crate::infrastructure::rpc::{DevPortalClient, RpcError, RpcTarget, RpcTimeouts};

#[derive(Debug, Error)]
pub enum ConnectError {
    /// Discovery finished without finding a developer server.
    #[error("no GrayJay developer server found on the local network")]
    NoDevices,

    #[error(transparent)]
    Client(#[from] RpcError),
}

/// Runs discovery and returns a client bound to the first device found.
///
/// # Errors
///
/// [`ConnectError::NoDevices`] when discovery comes back empty, or
/// [`ConnectError::Client`] if the client cannot be built.
pub async fn connect_discovered(
    engine: &DiscoveryEngine,
    config: &DiscoveryConfig,
    timeouts: RpcTimeouts,
) -> Result<DevPortalClient, ConnectError> {
    let devices = engine.discover(config).await;
    let first = devices.first().ok_or(ConnectError::NoDevices)?;
    info!("connecting to {}", first.endpoint());
    Ok(DevPortalClient::new(RpcTarget::from(first))?.with_timeouts(timeouts))
}
