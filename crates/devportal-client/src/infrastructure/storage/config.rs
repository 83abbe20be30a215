//! TOML configuration for the `devportal` tool.
//!
//! Read from the platform config directory:
//! - Windows:  `%APPDATA%\devportal\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/devportal/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/devportal/config.toml`
//!
//! ```toml
//! log_level = "info"
//!
//! [target]
//! host = "192.168.1.20"      # optional; discovery runs when absent
//! port = 11337
//!
//! [discovery]
//! timeout_ms = 3000          # optional
//! skip_advertisement = false
//! force_sweep = false
//! verify_timeout_ms = 2000
//!
//! [client]
//! liveness_timeout_ms = 5000
//! request_timeout_ms = 10000
//! invoke_timeout_ms = 60000
//! ```
//!
//! Every section and field is optional.  Missing values take the defaults
//! shown above, so an empty file (or no file at all) is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use devportal_core::{DiscoveryConfig, DEV_SERVER_PORT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::rpc::RpcTimeouts;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub client: ClientSettings,
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Fixed developer server target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
    /// Host to talk to.  When absent, discovery picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoverySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub skip_advertisement: bool,
    #[serde(default)]
    pub force_sweep: bool,
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
}

/// Per-call timeouts of the RPC client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_invoke_timeout_ms")]
    pub invoke_timeout_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_port() -> u16 {
    DEV_SERVER_PORT
}
fn default_verify_timeout_ms() -> u64 {
    DiscoveryConfig::DEFAULT_VERIFY_TIMEOUT.as_millis() as u64
}
fn default_liveness_timeout_ms() -> u64 {
    RpcTimeouts::default().liveness.as_millis() as u64
}
fn default_request_timeout_ms() -> u64 {
    RpcTimeouts::default().request.as_millis() as u64
}
fn default_invoke_timeout_ms() -> u64 {
    RpcTimeouts::default().invoke.as_millis() as u64
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            skip_advertisement: false,
            force_sweep: false,
            verify_timeout_ms: default_verify_timeout_ms(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            liveness_timeout_ms: default_liveness_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            invoke_timeout_ms: default_invoke_timeout_ms(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            discovery: DiscoverySettings::default(),
            client: ClientSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl ToolConfig {
    /// Discovery settings as the engine takes them.
    pub fn to_discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            timeout: self.discovery.timeout_ms.map(Duration::from_millis),
            skip_advertisement: self.discovery.skip_advertisement,
            force_sweep: self.discovery.force_sweep,
            verify_timeout: Duration::from_millis(self.discovery.verify_timeout_ms),
        }
    }

    pub fn to_timeouts(&self) -> RpcTimeouts {
        RpcTimeouts {
            liveness: Duration::from_millis(self.client.liveness_timeout_ms),
            request: Duration::from_millis(self.client.request_timeout_ms),
            invoke: Duration::from_millis(self.client.invoke_timeout_ms),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Parses config text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<ToolConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Loads the config at `path`, returning defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ToolConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("devportal"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("devportal"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("devportal")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        // Arrange / Act
        let cfg = ToolConfig::default();

        // Assert
        assert_eq!(cfg.target.host, None);
        assert_eq!(cfg.target.port, 11337);
        assert_eq!(cfg.discovery.verify_timeout_ms, 2000);
        assert_eq!(cfg.client.liveness_timeout_ms, 5000);
        assert_eq!(cfg.client.request_timeout_ms, 10_000);
        assert_eq!(cfg.client.invoke_timeout_ms, 60_000);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let cfg = parse_config("").expect("empty config");
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        // Arrange
        let text = r#"
[target]
host = "192.168.1.20"

[discovery]
timeout_ms = 1500
force_sweep = true

[client]
invoke_timeout_ms = 5000
"#;

        // Act
        let cfg = parse_config(text).expect("partial config");

        // Assert
        assert_eq!(cfg.target.host.as_deref(), Some("192.168.1.20"));
        assert_eq!(cfg.target.port, 11337);
        assert_eq!(cfg.discovery.timeout_ms, Some(1500));
        assert!(cfg.discovery.force_sweep);
        assert!(!cfg.discovery.skip_advertisement);
        assert_eq!(cfg.client.invoke_timeout_ms, 5000);
        assert_eq!(cfg.client.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_to_discovery_config_maps_millisecond_fields() {
        // Arrange
        let mut cfg = ToolConfig::default();
        cfg.discovery.timeout_ms = Some(800);
        cfg.discovery.skip_advertisement = true;

        // Act
        let dc = cfg.to_discovery_config();

        // Assert
        assert_eq!(dc.timeout, Some(Duration::from_millis(800)));
        assert_eq!(dc.probe_timeout(), Duration::from_millis(800));
        assert_eq!(dc.verify_timeout, Duration::from_millis(2000));
        assert!(!dc.uses_advertisement());
    }

    #[test]
    fn test_to_timeouts_maps_client_section() {
        let mut cfg = ToolConfig::default();
        cfg.client.liveness_timeout_ms = 250;
        let t = cfg.to_timeouts();
        assert_eq!(t.liveness, Duration::from_millis(250));
        assert_eq!(t.invoke, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result = parse_config("[[[ not valid toml");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_returns_defaults_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        let cfg = load_config(&path).expect("missing file is not an error");
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn test_load_config_reads_file_from_disk() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("devportal_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n[target]\nport = 8080\n").unwrap();

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.target.port, 8080);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_on_directory_is_io_error() {
        let dir = std::env::temp_dir();
        let result = load_config(&dir);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_default_config_path_ends_with_config_toml() {
        // NoPlatformConfigDir is acceptable in a stripped environment.
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("devportal/config.toml"), "got {path:?}");
        }
    }
}
