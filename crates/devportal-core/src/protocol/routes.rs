//! Route table of the GrayJay developer server.
//!
//! | Route                         | Method | Purpose                         |
//! |-------------------------------|--------|---------------------------------|
//! | `/dev`                        | GET    | liveness (200 or 302 = alive)   |
//! | `/plugin/updateTestPlugin`    | POST   | inject plugin config + script   |
//! | `/plugin/remoteTest`          | POST   | call a method on the test plugin|
//! | `/plugin/remoteCall`          | POST   | call a method on a named object |
//! | `/plugin/remoteProp`          | GET    | read a property                 |
//! | `/plugin/isLoggedIn`          | GET    | login flag                      |
//! | `/plugin/getDevLogs`          | GET    | developer log entries           |
//! | `/plugin/getWarnings`         | POST   | plugin warnings                 |
//! | `/plugin/packageGet`          | GET    | package source text             |
//! | `/get`                        | POST   | server-side proxy fetch         |
//! | `/plugin/loginTestPlugin` etc.| POST   | auth lifecycle test hooks       |
//!
//! Query values are percent-encoded; the server decodes them.

use urlencoding::encode;

pub const HEALTH: &str = "/dev";
pub const UPDATE_TEST_PLUGIN: &str = "/plugin/updateTestPlugin";
pub const IS_LOGGED_IN: &str = "/plugin/isLoggedIn";
pub const GET_WARNINGS: &str = "/plugin/getWarnings";
pub const LOGIN_TEST_PLUGIN: &str = "/plugin/loginTestPlugin";
pub const LOGOUT_TEST_PLUGIN: &str = "/plugin/logoutTestPlugin";
pub const CAPTCHA_TEST_PLUGIN: &str = "/plugin/captchaTestPlugin";

/// Log index meaning "everything the server still holds".
pub const ALL_LOGS: i64 = -1;

/// Content type the proxy route uses when the caller does not pick one.
pub const DEFAULT_PROXY_CONTENT_TYPE: &str = "text/json";

/// Method invocation on the currently injected test plugin, or on the object
/// named by `id` when one is given.
pub fn invoke(id: Option<&str>, method: &str) -> String {
    match id {
        Some(id) => format!(
            "/plugin/remoteCall?id={}&method={}",
            encode(id),
            encode(method)
        ),
        None => format!("/plugin/remoteTest?method={}", encode(method)),
    }
}

pub fn remote_prop(id: &str, prop: &str) -> String {
    format!("/plugin/remoteProp?id={}&prop={}", encode(id), encode(prop))
}

pub fn dev_logs(index: i64) -> String {
    format!("/plugin/getDevLogs?index={index}")
}

pub fn package_get(name: &str) -> String {
    format!("/plugin/packageGet?variable={}", encode(name))
}

pub fn proxy_get(content_type: &str) -> String {
    format!("/get?CT={}", encode(content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_without_id_targets_remote_test() {
        assert_eq!(invoke(None, "getHome"), "/plugin/remoteTest?method=getHome");
    }

    #[test]
    fn test_invoke_with_id_targets_remote_call() {
        assert_eq!(
            invoke(Some("obj-1"), "getName"),
            "/plugin/remoteCall?id=obj-1&method=getName"
        );
    }

    #[test]
    fn test_query_values_are_percent_encoded() {
        assert_eq!(proxy_get("text/json"), "/get?CT=text%2Fjson");
        assert_eq!(
            remote_prop("a b", "x&y"),
            "/plugin/remoteProp?id=a%20b&prop=x%26y"
        );
    }

    #[test]
    fn test_dev_logs_accepts_negative_index() {
        assert_eq!(dev_logs(ALL_LOGS), "/plugin/getDevLogs?index=-1");
    }

    #[test]
    fn test_package_get_uses_variable_parameter() {
        assert_eq!(package_get("Http"), "/plugin/packageGet?variable=Http");
    }
}
