//! Normalized HTTP responses.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// Body returned for a successful response without content.
pub const EMPTY_OBJECT: &str = "{}";

/// One response, read in full and normalized.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code.
    pub status: u16,
    /// Body with the XSSI prefix removed; `{}` for an empty success.
    pub body: String,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ResponseEnvelope {
    /// Normalize a raw response body.
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, raw: String, xssi_prefix: &str) -> Self {
        let mut body = strip_xssi_prefix(raw, xssi_prefix);
        if status.is_success() && body.is_empty() {
            body = EMPTY_OBJECT.to_string();
        }

        Self {
            status: status.as_u16(),
            body,
            headers,
        }
    }

    /// Returns true for a status in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Turn a non-2xx response into an `Api` error carrying its body.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::new(ErrorKind::Api {
                status: self.status,
                body: self.body,
            }))
        }
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }

    /// Take the body.
    pub fn into_body(self) -> String {
        self.body
    }
}

/// Remove `prefix` from the start of `body` when present.
pub fn strip_xssi_prefix(body: String, prefix: &str) -> String {
    if prefix.is_empty() {
        return body;
    }
    match body.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => body,
    }
}
