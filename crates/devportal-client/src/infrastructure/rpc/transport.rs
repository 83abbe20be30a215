//! GET/POST primitives against one developer server.
//!
//! # Body decoding
//!
//! The server answers with JSON most of the time but not always (package
//! source, proxy fetches, some error pages).  A body that parses as JSON is
//! returned decoded; anything else comes back as a JSON string holding the
//! raw text.  An empty POST body is `null`.
//!
//! # Hang-ups
//!
//! Some POST routes (plugin injection in particular) accept the request and
//! then close the connection without writing a response.  hyper reports this
//! as an incomplete message; some platforms report a connection reset
//! instead.  [`HttpTransport::post`] treats both as a successful `null`
//! result.  GET does not: a GET that never gets an answer failed.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use devportal_core::protocol::routes;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::error::RpcError;
use crate::infrastructure::probe::{is_alive_status, USER_AGENT};

/// Per-call timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcTimeouts {
    /// Health check (`ping`, `load_portal`).
    pub liveness: Duration,
    /// Data GETs.
    pub request: Duration,
    /// POSTs, including remote method invocation.
    pub invoke: Duration,
}

impl Default for RpcTimeouts {
    fn default() -> Self {
        Self {
            liveness: Duration::from_secs(5),
            request: Duration::from_secs(10),
            invoke: Duration::from_secs(60),
        }
    }
}

/// A POST body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    /// Sent as-is.
    Text(String),
}

impl Payload {
    /// Serialises `value` into a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Encode`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, RpcError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    fn into_body(self) -> Result<String, RpcError> {
        Ok(match self {
            Self::Empty => String::new(),
            Self::Json(value) => serde_json::to_string(&value)?,
            Self::Text(text) => text,
        })
    }
}

/// HTTP primitives bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`RpcError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RpcError> {
        // No idle pooling: a stale pooled connection closing under us would
        // look exactly like a hang-up.
        let client = Client::builder()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /dev`; `true` on 200 or 302.  Every failure is `false`.
    pub async fn is_alive(&self, timeout: Duration) -> bool {
        match self
            .client
            .get(self.url(routes::HEALTH))
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => is_alive_status(response.status()),
            Err(e) => {
                trace!("health check failed: {e}");
                false
            }
        }
    }

    /// GET `path`.  Any 2xx is success.
    ///
    /// # Errors
    ///
    /// [`RpcError::Status`] for other statuses, [`RpcError::Timeout`] or
    /// [`RpcError::Transport`] when no complete response arrives.
    pub async fn get(&self, path: &str, timeout: Duration) -> Result<Value, RpcError> {
        debug!("GET {path}");
        let response = self
            .client
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, text));
        }
        Ok(decode(text))
    }

    /// POST `payload` to `path` as `application/json`.  200 and 204 are
    /// success, as is a hang-up before any response.
    ///
    /// # Errors
    ///
    /// [`RpcError::Status`] for other statuses, [`RpcError::Encode`] if the
    /// payload cannot be serialised, [`RpcError::Timeout`] or
    /// [`RpcError::Transport`] for every other failure.
    pub async fn post(
        &self,
        path: &str,
        payload: Payload,
        timeout: Duration,
    ) -> Result<Value, RpcError> {
        debug!("POST {path}");
        let body = payload.into_body()?;
        let sent = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if is_hang_up(&e) => {
                debug!("POST {path}: server closed the connection without a response");
                return Ok(Value::Null);
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        let text = response.text().await?;
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            return Err(status_error(status, text));
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(decode(text))
    }
}

fn status_error(status: StatusCode, body: String) -> RpcError {
    RpcError::Status {
        status: status.as_u16(),
        body,
    }
}

/// JSON if it parses, otherwise the raw text as a JSON string.
fn decode(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

/// Recognises a connection the peer closed (or reset) before sending any
/// response, anywhere in the error's source chain.
pub(crate) fn is_hang_up(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(hyper_err) = e.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() {
                return true;
            }
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = e.source();
    }
    false
}

// ── Tests ─────────────────────────────────────────────────────────────────────
