//! HMAC-signed JWT bearer tokens.
//!
//! The claims template is immutable once the signer is built. Each call to
//! [`HmacJwt::sign`] works on a fresh copy, so concurrent signings never
//! observe each other's `nbf`/`iat`/`exp` values.

use std::collections::BTreeMap;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use jsonwebtoken::{crypto, Algorithm, EncodingKey};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

/// HMAC algorithms accepted for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HmacAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl HmacAlgorithm {
    /// The registered `alg` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HmacAlgorithm::HS256 => "HS256",
            HmacAlgorithm::HS384 => "HS384",
            HmacAlgorithm::HS512 => "HS512",
        }
    }
}

impl FromStr for HmacAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HS256" => Ok(HmacAlgorithm::HS256),
            "HS384" => Ok(HmacAlgorithm::HS384),
            "HS512" => Ok(HmacAlgorithm::HS512),
            other => Err(Error::new(ErrorKind::UnsupportedAlgorithm(other.to_string()))),
        }
    }
}

impl From<HmacAlgorithm> for Algorithm {
    fn from(alg: HmacAlgorithm) -> Self {
        match alg {
            HmacAlgorithm::HS256 => Algorithm::HS256,
            HmacAlgorithm::HS384 => Algorithm::HS384,
            HmacAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// Signs a claims template with a shared HMAC secret.
///
/// The secret is redacted in Debug output.
#[derive(Clone)]
pub struct HmacJwt {
    secret: Vec<u8>,
    algorithm: String,
    claims: Value,
    validity_minutes: Option<i64>,
}

impl std::fmt::Debug for HmacJwt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacJwt")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("claims", &self.claims)
            .field("validity_minutes", &self.validity_minutes)
            .finish()
    }
}

impl HmacJwt {
    /// Create a signer.
    ///
    /// The algorithm name is resolved when signing, so an unsupported name
    /// surfaces as a signing failure on the first request. The secret must
    /// not be empty.
    pub fn new(
        secret: impl Into<Vec<u8>>,
        algorithm: impl Into<String>,
        claims: Value,
    ) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "JWT secret is mandatory when a JWT is configured".to_string(),
            )));
        }

        Ok(Self {
            secret,
            algorithm: algorithm.into(),
            claims,
            validity_minutes: None,
        })
    }

    /// Create a signer from a claims document. The document must decode to a
    /// JSON object.
    pub fn from_claims_json(
        secret: impl Into<Vec<u8>>,
        algorithm: impl Into<String>,
        claims_json: &str,
    ) -> Result<Self> {
        let claims: Map<String, Value> = serde_json::from_str(claims_json).map_err(|e| {
            Error::with_source(
                ErrorKind::Config("JWT claims can't be decoded as a JSON object".to_string()),
                e,
            )
        })?;
        Self::new(secret, algorithm, Value::Object(claims))
    }

    /// Complete `nbf`, `iat` and `exp` on every signature when positive.
    pub fn with_validity_minutes(mut self, minutes: i64) -> Self {
        self.validity_minutes = Some(minutes);
        self
    }

    /// The configured algorithm name.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The claims template.
    pub fn claims(&self) -> &Value {
        &self.claims
    }

    /// Build the claims for one signature issued at `now` (epoch seconds).
    pub fn claims_at(&self, now: i64) -> Result<Map<String, Value>> {
        let mut claims = match &self.claims {
            Value::Object(map) => map.clone(),
            other => {
                return Err(Error::new(ErrorKind::InvalidClaims(format!(
                    "expected a JSON object, got {}",
                    json_type_name(other)
                ))))
            }
        };

        if let Some(minutes) = self.validity_minutes.filter(|m| *m > 0) {
            claims.insert("nbf".to_string(), Value::from(now));
            claims.insert("iat".to_string(), Value::from(now));
            claims.insert("exp".to_string(), Value::from(now + minutes * 60));
        }

        Ok(claims)
    }

    /// Sign a fresh copy of the claims.
    ///
    /// The header is emitted as `{"alg":..,"typ":"JWT"}` and claims keys are
    /// sorted, so a given template and secret always yield the same token.
    pub fn sign(&self) -> Result<String> {
        let algorithm: HmacAlgorithm = self.algorithm.parse()?;
        let claims = self.claims_at(Utc::now().timestamp())?;

        debug!(algorithm = algorithm.as_str(), "Signing JWT");

        let header = format!(r#"{{"alg":"{}","typ":"JWT"}}"#, algorithm.as_str());
        let sorted: BTreeMap<&String, &Value> = claims.iter().collect();
        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&sorted)?)
        );

        let key = EncodingKey::from_secret(&self.secret);
        let signature = crypto::sign(message.as_bytes(), &key, algorithm.into())?;
        Ok(format!("{}.{}", message, signature))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
