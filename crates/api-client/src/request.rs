//! Outbound request assembly.
//!
//! Headers are layered in a fixed order, later layers replacing earlier ones:
//! the JSON content type for non-empty bodies, then the configured static
//! headers, then the `Authorization` value produced by the authenticator.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;

use crate::error::{Error, ErrorKind, Result};

/// Builder for one API request.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<String>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Attach a raw JSON body. An empty body leaves the request bodyless.
    pub fn json_body(mut self, body: &str) -> Self {
        if !body.is_empty() {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            self.body = Some(body.to_string());
        }
        self
    }

    /// Apply static headers, replacing any of the same name.
    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Set the `Authorization` header, replacing any static value.
    pub fn authorization(mut self, value: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(value).map_err(|e| {
            Error::with_source(
                ErrorKind::Authentication("authorization value is not a valid header".to_string()),
                e,
            )
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Headers with sensitive values masked, for logging.
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let shown = if value.is_sensitive() || *name == AUTHORIZATION {
                    "[REDACTED]".to_string()
                } else {
                    value.to_str().unwrap_or("<binary>").to_string()
                };
                (name.to_string(), shown)
            })
            .collect()
    }

    pub(crate) fn into_reqwest(self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut req = client.request(self.method, &self.url).headers(self.headers);
        if let Some(body) = self.body {
            req = req.body(body);
        }
        req
    }
}

/// Parse a caller supplied verb.
pub fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.as_bytes())
        .map_err(|_| Error::config(format!("invalid HTTP method '{}'", method)))
}
