//! Error types for restapi-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for restapi-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for restapi-auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error stems from invalid configuration rather
    /// than from producing a credential for a request.
    pub fn is_config(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_))
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// JWT signing error.
    #[error("JWT error: {0}")]
    Jwt(String),

    /// The configured JWT algorithm is not an HMAC variant we can sign with.
    #[error("Unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The JWT claims template is not a JSON object.
    #[error("Invalid JWT claims: {0}")]
    InvalidClaims(String),

    /// The OAuth2 token endpoint rejected the grant.
    #[error("Token endpoint error: {status} {description}")]
    TokenEndpoint { status: u16, description: String },

    /// HTTP error while talking to the token endpoint.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Sanitize the error message to avoid exposing URLs with tokens
        let message = err.to_string();
        let sanitized = if message.contains("access_token") || message.contains("token=") {
            "HTTP request failed (details redacted for security)".to_string()
        } else {
            message
        };
        Error::with_source(ErrorKind::Http(sanitized), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::with_source(ErrorKind::Jwt(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}
