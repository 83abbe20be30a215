//! The uniform result envelope for call-shaped operations.

use serde::{Deserialize, Serialize};

/// Result of a remote plugin call.
///
/// Call-shaped operations never return a Rust error to their caller; every
/// failure (transport, timeout, server-reported) is folded into
/// `success = false` with a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcOutcome<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> RpcOutcome<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Converts into a `Result`, for callers that prefer `?`.
    ///
    /// # Errors
    ///
    /// Returns the error message when `success` is `false`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.result)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_carries_result_and_no_error() {
        let outcome = RpcOutcome::success(5);
        assert!(outcome.success);
        assert_eq!(outcome.result, Some(5));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_failure_into_result_returns_message() {
        let outcome: RpcOutcome<i32> = RpcOutcome::failure("boom");
        assert_eq!(outcome.into_result(), Err("boom".to_string()));
    }

    #[test]
    fn test_failure_serializes_without_result_field() {
        let outcome: RpcOutcome<i32> = RpcOutcome::failure("boom");
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"boom"}"#);
    }
}
