//! HTTP Basic credentials.
//!
//! The password is redacted in Debug output.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Username/password pair sent as HTTP Basic authorization.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BasicCredentials {
    /// Create credentials. Returns `None` unless both parts are non-empty,
    /// since Basic auth only applies when fully configured.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Option<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { username, password })
    }

    /// Get the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The `Authorization` header value.
    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}
