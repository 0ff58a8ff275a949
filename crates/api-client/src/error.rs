//! Error types for restapi-client.

/// Result type alias for restapi-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for restapi-client operations.
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

    /// Shorthand for a configuration error.
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Shorthand for a decoding error.
    pub(crate) fn decoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decoding(message.into()))
    }

    /// Returns true if the client could not be constructed from its options.
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration(_))
    }

    /// Returns true if no authorization could be produced for the request.
    pub fn is_authentication(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    /// Returns true for connection, TLS and timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_) | ErrorKind::Timeout)
    }

    /// Returns true if the request exceeded the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if the API answered with a non-2xx status.
    pub fn is_api(&self) -> bool {
        matches!(self.kind, ErrorKind::Api { .. })
    }

    /// Returns true if a body or field could not be decoded.
    pub fn is_decoding(&self) -> bool {
        matches!(self.kind, ErrorKind::Decoding(_))
    }

    /// Returns true if the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// The HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The response body of an API error.
    pub fn body(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid construction options.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The authorization header could not be produced.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Connection, DNS or TLS failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Non-2xx response.
    #[error("unexpected response code '{status}': {body}")]
    Api { status: u16, body: String },

    /// Body or field could not be decoded.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Cancelled by the caller before completion.
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_builder() {
            ErrorKind::Configuration(err.to_string())
        } else {
            ErrorKind::Transport(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Decoding(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(
            ErrorKind::Configuration(format!("Invalid URL: {}", err)),
            err,
        )
    }
}

impl From<restapi_auth::Error> for Error {
    fn from(err: restapi_auth::Error) -> Self {
        let kind = if err.is_config() {
            ErrorKind::Configuration(err.to_string())
        } else {
            ErrorKind::Authentication(err.to_string())
        };
        Error::with_source(kind, err)
    }
}
