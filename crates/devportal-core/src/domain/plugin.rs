//! Plugin descriptors and developer log entries.
//!
//! A GrayJay plugin is described by a JSON config file (name, id, script
//! URL, permissions, constants, ...).  The developer server receives that file
//! verbatim when a plugin is injected, so [`PluginConfig`] keeps every field
//! it does not know about in `extra` instead of dropping it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error type for plugin config parsing.
#[derive(Debug, Error)]
pub enum PluginConfigError {
    /// The text is not a valid plugin config document.
    #[error("failed to parse plugin config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field the developer server requires is empty.
    #[error("plugin config field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// A plugin config as forwarded to the developer server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub name: String,
    pub id: String,
    pub script_url: String,
    pub version: u32,
    #[serde(default)]
    pub platform_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_eval: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_claim_types: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<Map<String, Value>>,
    /// Fields not modelled above, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginConfig {
    /// Parses a plugin config document and checks the fields the developer
    /// server cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`PluginConfigError::Parse`] for malformed JSON or missing
    /// required fields, and [`PluginConfigError::EmptyField`] when `id` or
    /// `name` is blank.
    pub fn from_json(text: &str) -> Result<Self, PluginConfigError> {
        let config: PluginConfig = serde_json::from_str(text)?;
        if config.id.trim().is_empty() {
            return Err(PluginConfigError::EmptyField("id"));
        }
        if config.name.trim().is_empty() {
            return Err(PluginConfigError::EmptyField("name"));
        }
        Ok(config)
    }
}

/// One entry of the developer server's log buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevLog {
    pub id: i64,
    #[serde(default)]
    pub dev_id: String,
    #[serde(rename = "type", default)]
    pub log_type: String,
    #[serde(default)]
    pub log: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const YOUTUBE_CONFIG: &str = r#"{
        "name": "YouTube",
        "id": "35ae969a-a7db-11ed-afa1-0242ac120002",
        "scriptUrl": "./YoutubeScript.js",
        "version": 221,
        "platformUrl": "https://youtube.com",
        "allowEval": false,
        "allowUrls": ["youtube.com", ".youtube.com"],
        "constants": { "baseUrl": "https://www.youtube.com" },
        "changelog": { "221": ["fixes"] }
    }"#;

    #[test]
    fn test_from_json_parses_known_fields() {
        // Arrange / Act
        let cfg = PluginConfig::from_json(YOUTUBE_CONFIG).expect("valid config");

        // Assert
        assert_eq!(cfg.name, "YouTube");
        assert_eq!(cfg.version, 221);
        assert_eq!(cfg.allow_eval, Some(false));
        assert_eq!(cfg.allow_urls.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        // Arrange
        let cfg = PluginConfig::from_json(YOUTUBE_CONFIG).unwrap();

        // Act
        let json = serde_json::to_value(&cfg).unwrap();

        // Assert – `changelog` is not modelled but must reach the server
        assert_eq!(json["changelog"]["221"][0], "fixes");
        assert_eq!(json["scriptUrl"], "./YoutubeScript.js");
        assert!(json.get("packages").is_none(), "absent optionals stay absent");
    }

    #[test]
    fn test_from_json_rejects_blank_id() {
        let text = r#"{"name":"X","id":" ","scriptUrl":"s.js","version":1}"#;
        assert!(matches!(
            PluginConfig::from_json(text),
            Err(PluginConfigError::EmptyField("id"))
        ));
    }

    #[test]
    fn test_from_json_rejects_missing_script_url() {
        let text = r#"{"name":"X","id":"abc","version":1}"#;
        assert!(matches!(
            PluginConfig::from_json(text),
            Err(PluginConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_dev_log_reads_wire_names() {
        let log: DevLog =
            serde_json::from_str(r#"{"id":3,"devId":"abc","type":"LOG","log":"hello"}"#).unwrap();
        assert_eq!(log.id, 3);
        assert_eq!(log.dev_id, "abc");
        assert_eq!(log.log_type, "LOG");
        assert_eq!(log.log, "hello");
    }
}
