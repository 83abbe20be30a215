//! Typed operations of the developer server.
//!
//! Operations fall into three groups by how they report failure:
//!
//! | Group          | Operations                                         | On failure           |
//! |----------------|----------------------------------------------------|----------------------|
//! | probe-shaped   | `ping`, `load_portal`, `is_logged_in`, `get_dev_logs` | `false` / empty    |
//! | call-shaped    | `call`, `test_method`, `call_by_id`                | `RpcOutcome` failure |
//! | pass-through   | everything else                                    | `Err(RpcError)`      |
//!
//! A [`DevPortalClient`] holds no mutable state; clone it freely and call it
//! from as many tasks as needed.

use std::time::Duration;

use devportal_core::{
    disambiguate, login_state_from_body, logs_from_body, protocol::routes, DevLog,
    DeviceCandidate, PluginConfig, RpcOutcome, DEV_SERVER_PORT,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::RpcError;
use super::transport::{HttpTransport, Payload, RpcTimeouts};

/// Host and port of one developer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcTarget {
    pub host: String,
    pub port: u16,
}

impl RpcTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Target on the standard developer server port.
    pub fn with_default_port(host: impl Into<String>) -> Self {
        Self::new(host, DEV_SERVER_PORT)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl From<&DeviceCandidate> for RpcTarget {
    fn from(candidate: &DeviceCandidate) -> Self {
        Self::new(candidate.host.clone(), candidate.dev_port)
    }
}

/// Body of the plugin injection request.
#[derive(Debug, Serialize)]
pub struct InjectRequest<'a> {
    pub url: &'a str,
    pub config: &'a PluginConfig,
}

/// Client for one developer server.
#[derive(Debug, Clone)]
pub struct DevPortalClient {
    target: RpcTarget,
    transport: HttpTransport,
    timeouts: RpcTimeouts,
}

impl DevPortalClient {
    /// # Errors
    ///
    /// Returns [`RpcError::Transport`] if the HTTP client cannot be built.
    pub fn new(target: RpcTarget) -> Result<Self, RpcError> {
        let transport = HttpTransport::new(target.base_url())?;
        Ok(Self {
            target,
            transport,
            timeouts: RpcTimeouts::default(),
        })
    }

    pub fn with_timeouts(mut self, timeouts: RpcTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn target(&self) -> &RpcTarget {
        &self.target
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn timeouts(&self) -> RpcTimeouts {
        self.timeouts
    }

    // ── Liveness ──────────────────────────────────────────────────────────────

    /// `true` if the health route answers 200 or 302.
    pub async fn ping(&self) -> bool {
        self.transport.is_alive(self.timeouts.liveness).await
    }

    /// Pings, then gives the portal `wait` to initialise if it is up.
    pub async fn load_portal(&self, wait: Duration) -> bool {
        let up = self.ping().await;
        if up && !wait.is_zero() {
            debug!("portal up, waiting {}ms for it to settle", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
        up
    }

    // ── Plugin injection and remote calls ─────────────────────────────────────

    /// Pushes `config` and its script URL to the server.
    ///
    /// # Errors
    ///
    /// Any [`RpcError`] except a hang-up, which counts as success.
    pub async fn update_test_plugin(
        &self,
        script_url: &str,
        config: &PluginConfig,
    ) -> Result<Value, RpcError> {
        let payload = Payload::json(&InjectRequest {
            url: script_url,
            config,
        })?;
        self.transport
            .post(routes::UPDATE_TEST_PLUGIN, payload, self.timeouts.invoke)
            .await
    }

    /// Calls `method` on the injected test plugin.
    pub async fn call(&self, method: &str, args: &[Value]) -> RpcOutcome<Value> {
        self.invoke(None, method, args).await
    }

    /// Same as [`call`](Self::call).
    pub async fn test_method(&self, method: &str, args: &[Value]) -> RpcOutcome<Value> {
        self.call(method, args).await
    }

    /// Calls `method` on the server-side object named `id`.
    pub async fn call_by_id(&self, id: &str, method: &str, args: &[Value]) -> RpcOutcome<Value> {
        self.invoke(Some(id), method, args).await
    }

    async fn invoke(&self, id: Option<&str>, method: &str, args: &[Value]) -> RpcOutcome<Value> {
        let payload = match Payload::json(args) {
            Ok(payload) => payload,
            Err(e) => return RpcOutcome::failure(e.to_string()),
        };
        let path = routes::invoke(id, method);
        match self.transport.post(&path, payload, self.timeouts.invoke).await {
            Ok(body) => disambiguate(body),
            Err(e) => {
                warn!("{method} on {} failed: {e}", self.target.host);
                RpcOutcome::failure(e.to_string())
            }
        }
    }

    // ── Data ──────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Any [`RpcError`] from the GET.
    pub async fn get_property(&self, id: &str, prop: &str) -> Result<Value, RpcError> {
        self.transport
            .get(&routes::remote_prop(id, prop), self.timeouts.request)
            .await
    }

    pub async fn is_logged_in(&self) -> bool {
        match self
            .transport
            .get(routes::IS_LOGGED_IN, self.timeouts.request)
            .await
        {
            Ok(body) => login_state_from_body(&body),
            Err(e) => {
                debug!("login state unavailable: {e}");
                false
            }
        }
    }

    /// Log entries from `index` on; [`routes::ALL_LOGS`] for everything.
    pub async fn get_dev_logs(&self, index: i64) -> Vec<DevLog> {
        match self
            .transport
            .get(&routes::dev_logs(index), self.timeouts.request)
            .await
        {
            Ok(body) => logs_from_body(body),
            Err(e) => {
                debug!("dev logs unavailable: {e}");
                Vec::new()
            }
        }
    }

    /// # Errors
    ///
    /// Any [`RpcError`] except a hang-up.
    pub async fn get_warnings(&self) -> Result<Value, RpcError> {
        self.transport
            .post(routes::GET_WARNINGS, Payload::Empty, self.timeouts.invoke)
            .await
    }

    /// Source text of the package bound to `name`.
    ///
    /// # Errors
    ///
    /// Any [`RpcError`] from the GET.
    pub async fn get_package(&self, name: &str) -> Result<String, RpcError> {
        let body = self
            .transport
            .get(&routes::package_get(name), self.timeouts.request)
            .await?;
        Ok(match body {
            Value::String(source) => source,
            other => other.to_string(),
        })
    }

    /// Has the server fetch `url` on our behalf.  `content_type` defaults to
    /// [`routes::DEFAULT_PROXY_CONTENT_TYPE`].
    ///
    /// # Errors
    ///
    /// Any [`RpcError`] except a hang-up.
    pub async fn fetch_content(
        &self,
        url: &str,
        content_type: Option<&str>,
    ) -> Result<Value, RpcError> {
        let path = routes::proxy_get(content_type.unwrap_or(routes::DEFAULT_PROXY_CONTENT_TYPE));
        self.transport
            .post(&path, Payload::json(url)?, self.timeouts.invoke)
            .await
    }

    // ── Auth lifecycle hooks ──────────────────────────────────────────────────

    /// # Errors
    ///
    /// Any [`RpcError`] except a hang-up.
    pub async fn login_test_plugin(&self) -> Result<Value, RpcError> {
        self.post_empty(routes::LOGIN_TEST_PLUGIN).await
    }

    /// # Errors
    ///
    /// Any [`RpcError`] except a hang-up.
    pub async fn logout_test_plugin(&self) -> Result<Value, RpcError> {
        self.post_empty(routes::LOGOUT_TEST_PLUGIN).await
    }

    /// # Errors
    ///
    /// Any [`RpcError`] except a hang-up.
    pub async fn captcha_test_plugin(&self) -> Result<Value, RpcError> {
        self.post_empty(routes::CAPTCHA_TEST_PLUGIN).await
    }

    async fn post_empty(&self, path: &str) -> Result<Value, RpcError> {
        self.transport
            .post(path, Payload::Empty, self.timeouts.invoke)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_base_url() {
        let target = RpcTarget::new("192.168.1.20", 8080);
        assert_eq!(target.base_url(), "http://192.168.1.20:8080");
    }

    #[test]
    fn test_target_default_port_is_dev_server_port() {
        assert_eq!(RpcTarget::with_default_port("h").port, 11337);
    }

    #[test]
    fn test_target_from_candidate_uses_dev_port() {
        // Arrange
        let candidate = DeviceCandidate::verified("10.0.0.3", 11337, Duration::from_millis(3))
            .with_advertisement(Some("Pixel".to_string()), Some(12315));

        // Act
        let target = RpcTarget::from(&candidate);

        // Assert
        assert_eq!(target, RpcTarget::new("10.0.0.3", 11337));
    }

    #[test]
    fn test_client_exposes_target_and_base_url() {
        let client = DevPortalClient::new(RpcTarget::new("localhost", 11337)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11337");
        assert_eq!(client.target().host, "localhost");
        assert_eq!(client.timeouts(), RpcTimeouts::default());
    }

    #[test]
    fn test_inject_request_serializes_url_and_config() {
        // Arrange
        let config = PluginConfig::from_json(
            r#"{"name":"Demo","id":"abc","scriptUrl":"./script.js","version":1}"#,
        )
        .unwrap();

        // Act
        let json = serde_json::to_value(InjectRequest {
            url: "http://dev/script.js",
            config: &config,
        })
        .unwrap();

        // Assert
        assert_eq!(json["url"], "http://dev/script.js");
        assert_eq!(json["config"]["id"], "abc");
        assert_eq!(json["config"]["scriptUrl"], "./script.js");
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DevPortalClient>();
    }
}
