//! Interpretation of developer server response bodies.
//!
//! The developer server is not consistent about how it wraps results.  A
//! remote call may come back as `{"success": true, "result": X}`, as a bare
//! `X`, or as `{"error": "..."}` next to other fields.  The rules below fold
//! all of these into one [`RpcOutcome`].
//!
//! # Disambiguation order
//!
//! 1. An object with a non-null `error` field is a failure, whatever else it
//!    carries.
//! 2. Otherwise an object with a `result` field yields that field.
//! 3. Otherwise the whole body is the result.

use serde_json::Value;
use tracing::trace;

use crate::domain::outcome::RpcOutcome;
use crate::domain::plugin::DevLog;

/// Folds a decoded response body into an [`RpcOutcome`].
pub fn disambiguate(body: Value) -> RpcOutcome<Value> {
    match body {
        Value::Object(mut map) => {
            if map.get("error").is_some_and(|e| !e.is_null()) {
                let message = map.remove("error").map(error_message).unwrap_or_default();
                trace!("server reported error: {message}");
                return RpcOutcome::failure(message);
            }
            match map.remove("result") {
                Some(result) => RpcOutcome::success(result),
                None => RpcOutcome::success(Value::Object(map)),
            }
        }
        other => RpcOutcome::success(other),
    }
}

/// String values are used verbatim; anything else is rendered as JSON.
fn error_message(error: Value) -> String {
    match error {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Reads a log listing.  Anything that is not an array yields no entries;
/// array elements that do not look like log entries are skipped.
pub fn logs_from_body(body: Value) -> Vec<DevLog> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Reads the login flag: `true` or `{"isLoggedIn": true}`.  Everything else,
/// including absent or garbled bodies, means logged out.
pub fn login_state_from_body(body: &Value) -> bool {
    match body {
        Value::Bool(flag) => *flag,
        Value::Object(map) => matches!(map.get("isLoggedIn"), Some(Value::Bool(true))),
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enveloped_and_bare_results_unwrap_to_same_value() {
        // Arrange
        let x = json!({"results": [1, 2, 3], "hasMore": true});
        let enveloped = json!({"success": true, "result": x.clone()});

        // Act
        let a = disambiguate(enveloped);
        let b = disambiguate(x.clone());

        // Assert
        assert_eq!(a.result, Some(x.clone()));
        assert_eq!(b.result, Some(x));
        assert!(a.success && b.success);
    }

    #[test]
    fn test_error_field_wins_over_result() {
        // Arrange
        let body = json!({"error": "boom", "result": 1, "success": true});

        // Act
        let outcome = disambiguate(body);

        // Assert
        assert_eq!(outcome, RpcOutcome::failure("boom"));
    }

    #[test]
    fn test_null_error_field_is_not_a_failure() {
        let outcome = disambiguate(json!({"error": null, "result": 7}));
        assert_eq!(outcome.result, Some(json!(7)));
    }

    #[test]
    fn test_null_error_field_is_kept_in_whole_body_result() {
        let outcome = disambiguate(json!({"error": null, "x": 1}));
        assert_eq!(outcome.result, Some(json!({"error": null, "x": 1})));
    }

    #[test]
    fn test_structured_error_is_rendered_as_json() {
        let outcome = disambiguate(json!({"error": {"code": 3}}));
        assert_eq!(outcome.error.as_deref(), Some(r#"{"code":3}"#));
    }

    #[test]
    fn test_scalar_and_null_bodies_are_results() {
        assert_eq!(disambiguate(json!(true)).result, Some(json!(true)));
        assert_eq!(disambiguate(Value::Null).result, Some(Value::Null));
        assert_eq!(disambiguate(json!("text")).result, Some(json!("text")));
    }

    #[test]
    fn test_logs_from_object_body_is_empty() {
        assert!(logs_from_body(json!({"logs": []})).is_empty());
    }

    #[test]
    fn test_logs_from_array_skips_malformed_entries() {
        // Arrange
        let body = json!([
            {"id": 1, "devId": "d", "type": "LOG", "log": "a"},
            "garbage",
            {"id": 2, "devId": "d", "type": "ERROR", "log": "b"}
        ]);

        // Act
        let logs = logs_from_body(body);

        // Assert
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].log_type, "ERROR");
    }

    #[test]
    fn test_login_state_accepts_flag_and_object() {
        assert!(login_state_from_body(&json!(true)));
        assert!(login_state_from_body(&json!({"isLoggedIn": true})));
    }

    #[test]
    fn test_login_state_garbled_bodies_are_false() {
        assert!(!login_state_from_body(&json!({"isLoggedIn": "yes"})));
        assert!(!login_state_from_body(&json!("true")));
        assert!(!login_state_from_body(&Value::Null));
        assert!(!login_state_from_body(&json!({})));
    }
}
