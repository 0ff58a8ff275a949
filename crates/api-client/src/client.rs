//! Request executor.

use std::sync::Arc;

use restapi_auth::{Authenticator, ClientCredentials};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::rate_limit::RateLimiter;
use crate::request::{parse_method, RequestBuilder};
use crate::response::ResponseEnvelope;

/// HTTP client for one remote JSON API.
///
/// Cloning is cheap; clones share the connection pool, cookie jar, token
/// cache and rate limiter.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    authenticator: Authenticator,
    limiter: Arc<RateLimiter>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("auth", &self.authenticator.method().name())
            .field(
                "basic_override",
                &self.authenticator.basic_override().map(|b| b.username()),
            )
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl ApiClient {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .cookie_store(config.use_cookies);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder = config.tls.apply(builder);

        let http = builder.build().map_err(|e| {
            Error::with_source(
                ErrorKind::Configuration(format!("could not build HTTP client: {}", e)),
                e,
            )
        })?;

        let oauth = config
            .auth
            .oauth
            .clone()
            .map(|oauth| ClientCredentials::new(oauth, http.clone()));
        let authenticator =
            Authenticator::resolve(config.auth.jwt.clone(), oauth, config.auth.basic.clone());
        let limiter = RateLimiter::from_config(config.rate_limit)?;

        debug!(
            uri = %config.uri,
            auth = authenticator.method().name(),
            rate_limit = ?config.rate_limit,
            "API client created"
        );

        Ok(Self {
            http,
            config: Arc::new(config),
            authenticator,
            limiter: Arc::new(limiter),
        })
    }

    /// Create a client and check `test_path`, if configured, with the read verb.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config)?;

        if let Some(test_path) = client.config.test_path.as_deref() {
            debug!(test_path, "Checking API connectivity");
            client
                .send_request(client.config.read_method.as_str(), test_path, "")
                .await?;
        }

        Ok(client)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the authenticator.
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Get the rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Send `body` to `uri + path` and return the response body.
    ///
    /// Non-2xx responses fail with an `Api` error that keeps the body.
    pub async fn send_request(&self, method: &str, path: &str, body: &str) -> Result<String> {
        self.send_request_with_cancel(method, path, body, &CancellationToken::new())
            .await
    }

    /// Like [`send_request`](Self::send_request), giving up with `Cancelled`
    /// once `cancel` fires.
    pub async fn send_request_with_cancel(
        &self,
        method: &str,
        path: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let response = self.execute_with_cancel(method, path, body, cancel).await?;
        Ok(response.error_for_status()?.into_body())
    }

    /// Send a request and return the normalized response whatever its status.
    pub async fn execute(&self, method: &str, path: &str, body: &str) -> Result<ResponseEnvelope> {
        self.execute_with_cancel(method, path, body, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), giving up with `Cancelled` once
    /// `cancel` fires.
    #[instrument(skip(self, body, cancel), fields(url = tracing::field::Empty))]
    pub async fn execute_with_cancel(
        &self,
        method: &str,
        path: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope> {
        let method = parse_method(method)?;
        let url = format!("{}{}", self.config.uri, path);
        tracing::Span::current().record("url", url.as_str());

        let mut request = RequestBuilder::new(method, url)
            .json_body(body)
            .headers(&self.config.headers);

        let authorization = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::new(ErrorKind::Cancelled)),
            authorization = self.authenticator.authorization() => authorization?,
        };
        if let Some(authorization) = authorization {
            request = request.authorization(&authorization)?;
        }

        self.limiter.acquire(cancel).await?;

        if self.config.debug {
            debug!(headers = ?request.redacted_headers(), body, "Sending request");
        } else {
            debug!("Sending request");
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::new(ErrorKind::Cancelled)),
            response = request.into_reqwest(&self.http).send() => response?,
        };

        let status = response.status();
        let headers = response.headers().clone();
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::new(ErrorKind::Cancelled)),
            text = response.text() => text?,
        };

        let envelope = ResponseEnvelope::new(status, headers, raw, &self.config.xssi_prefix);

        if self.config.debug {
            debug!(status = envelope.status, body = %envelope.body, "Response received");
        } else {
            debug!(status = envelope.status, "Response received");
        }

        Ok(envelope)
    }
}
