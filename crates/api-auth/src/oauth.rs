//! OAuth 2.0 client-credentials grant.
//!
//! The client authenticates as itself against a token endpoint and the
//! resulting access token is cached until shortly before it expires.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Error, ErrorKind, Result};

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_DELTA: Duration = Duration::from_secs(10);

/// Client-credentials grant configuration.
///
/// `client_secret` is redacted in Debug output.
#[derive(Clone)]
pub struct ClientCredentialsConfig {
    /// Client identifier.
    pub client_id: String,
    client_secret: String,
    /// Token endpoint.
    pub token_url: Url,
    /// Scopes to request (space-joined on the wire).
    pub scopes: Vec<String>,
    /// Additional form parameters sent to the token endpoint.
    pub endpoint_params: BTreeMap<String, Vec<String>>,
}

impl std::fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url.as_str())
            .field("scopes", &self.scopes)
            .field("endpoint_params", &self.endpoint_params)
            .finish()
    }
}

impl ClientCredentialsConfig {
    /// Create a new config. All three values must be non-empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: &str,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "OAuth2 client id and client secret are required".to_string(),
            )));
        }

        Ok(Self {
            client_id,
            client_secret,
            token_url: Url::parse(token_url)?,
            scopes: Vec::new(),
            endpoint_params: BTreeMap::new(),
        })
    }

    /// Set the scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Set the extra endpoint parameters.
    pub fn with_endpoint_params(mut self, params: BTreeMap<String, Vec<String>>) -> Self {
        self.endpoint_params = params;
        self
    }

    fn form_params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![("grant_type", "client_credentials")];
        for (name, values) in &self.endpoint_params {
            for value in values {
                params.push((name.as_str(), value.as_str()));
            }
        }
        params
    }
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now + EXPIRY_DELTA < deadline,
            None => true,
        }
    }
}

/// Fetches and caches access tokens for the client-credentials grant.
///
/// Token requests go through the supplied HTTP client so that they share
/// the caller's TLS settings.
pub struct ClientCredentials {
    config: ClientCredentialsConfig,
    http_client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClientCredentials {
    /// Create a token source using the given HTTP client.
    pub fn new(config: ClientCredentialsConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            cached: Mutex::new(None),
        }
    }

    /// Get the grant configuration.
    pub fn config(&self) -> &ClientCredentialsConfig {
        &self.config
    }

    /// Return a cached access token, or request a new one.
    ///
    /// The lock is held across the fetch so concurrent callers wait for a
    /// single token request.
    #[instrument(skip(self), fields(token_url = %self.config.token_url))]
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let mut params = self.config.form_params();
        let scope = self.config.scopes.join(" ");
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }
        let body = serde_urlencoded::to_string(params)?;

        debug!("Requesting client-credentials token");

        let requested_at = Instant::now();
        let response = self
            .http_client
            .post(self.config.token_url.clone())
            .basic_auth(
                urlencoding::encode(&self.config.client_id),
                Some(urlencoding::encode(&self.config.client_secret)),
            )
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let description = serde_json::from_str::<OAuthErrorResponse>(&text)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{} - {}", e.error, desc),
                    None => e.error,
                })
                .unwrap_or_else(|_| "token request rejected".to_string());
            return Err(Error::new(ErrorKind::TokenEndpoint {
                status: status.as_u16(),
                description,
            }));
        }

        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;
        if token.access_token.is_empty() {
            return Err(Error::new(ErrorKind::TokenEndpoint {
                status: status.as_u16(),
                description: "server response missing access_token".to_string(),
            }));
        }

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: token
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| requested_at + Duration::from_secs(secs)),
        })
    }
}

/// Token response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}
