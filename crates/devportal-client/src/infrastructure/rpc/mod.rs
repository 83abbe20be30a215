//! HTTP client for the developer server.
//!
//! - `transport` – the two primitive verbs (GET, POST) plus the liveness
//!   check, with status handling and body decoding.
//! - `client` – [`DevPortalClient`], the typed operations built on them.
//! - `error` – [`RpcError`].

pub mod client;
pub mod error;
pub mod transport;

pub use client::{DevPortalClient, InjectRequest, RpcTarget};
pub use error::RpcError;
pub use transport::{HttpTransport, Payload, RpcTimeouts};
