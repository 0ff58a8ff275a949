//! Selection and application of the request authorization scheme.
//!
//! The scheme is resolved once, when the client is built. Basic credentials
//! are layered on top of a bearer scheme and always provide the final
//! `Authorization` value, giving the precedence
//! static headers → JWT → OAuth2 → Basic.

use std::sync::Arc;

use tracing::warn;

use crate::credentials::BasicCredentials;
use crate::error::Result;
use crate::jwt::HmacJwt;
use crate::oauth::ClientCredentials;

/// The active authorization scheme.
#[derive(Debug, Clone, Default)]
pub enum AuthMethod {
    /// No `Authorization` header is produced.
    #[default]
    None,
    /// A freshly signed HMAC JWT per request.
    JwtHashedToken(HmacJwt),
    /// An access token from the client-credentials grant.
    OAuth2ClientCredentials(Arc<ClientCredentials>),
    /// HTTP Basic.
    Basic(BasicCredentials),
}

impl AuthMethod {
    /// Short scheme name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::JwtHashedToken(_) => "jwt",
            AuthMethod::OAuth2ClientCredentials(_) => "oauth2",
            AuthMethod::Basic(_) => "basic",
        }
    }
}

/// Produces the `Authorization` header value for outbound requests.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    method: AuthMethod,
    basic_override: Option<BasicCredentials>,
}

impl Authenticator {
    /// Resolve the scheme from whatever was configured.
    ///
    /// OAuth2 takes the place of JWT when both are given, since its header
    /// would overwrite the JWT one anyway. Basic becomes the primary scheme
    /// when nothing else is set and an override layer otherwise.
    pub fn resolve(
        jwt: Option<HmacJwt>,
        oauth: Option<ClientCredentials>,
        basic: Option<BasicCredentials>,
    ) -> Self {
        let method = match (jwt, oauth) {
            (jwt, Some(oauth)) => {
                if jwt.is_some() {
                    warn!("Both JWT and OAuth2 are configured; the JWT is ignored");
                }
                AuthMethod::OAuth2ClientCredentials(Arc::new(oauth))
            }
            (Some(jwt), None) => AuthMethod::JwtHashedToken(jwt),
            (None, None) => {
                return Self {
                    method: basic.map(AuthMethod::Basic).unwrap_or_default(),
                    basic_override: None,
                }
            }
        };

        Self {
            method,
            basic_override: basic,
        }
    }

    /// The primary scheme.
    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// Basic credentials layered over the primary scheme, if any.
    pub fn basic_override(&self) -> Option<&BasicCredentials> {
        self.basic_override.as_ref()
    }

    /// Compute the `Authorization` value for one request.
    ///
    /// The primary scheme is always evaluated so that its failures surface
    /// even when Basic overrides the resulting value.
    pub async fn authorization(&self) -> Result<Option<String>> {
        let mut value = match &self.method {
            AuthMethod::None => None,
            AuthMethod::JwtHashedToken(jwt) => Some(format!("Bearer {}", jwt.sign()?)),
            AuthMethod::OAuth2ClientCredentials(source) => {
                Some(format!("Bearer {}", source.access_token().await?))
            }
            AuthMethod::Basic(basic) => Some(basic.header_value()),
        };

        if let Some(basic) = &self.basic_override {
            value = Some(basic.header_value());
        }

        Ok(value)
    }
}
