//! # restapi-client
//!
//! Generic client for JSON resources behind an HTTP API.
//!
//! This crate provides:
//! - Validated configuration with a single defaulting step
//! - TLS setup: client certificates, private root CAs, insecure mode
//! - Authorization via HMAC JWT, OAuth2 client credentials or Basic
//! - A token-bucket rate limiter shared by every request
//! - Response normalization (XSSI prefixes, empty bodies, API errors)
//! - Helpers that read identifiers from bodies of any shape
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RemoteObject helpers                   │
//! │  create / read / update / delete / import                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         ApiClient                           │
//! │  headers → Authenticator → RateLimiter → reqwest → envelope │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                ClientConfig + TlsSettings                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use restapi_client::{ApiClient, ClientConfig, payload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restapi_client::Error> {
//!     let config = ClientConfig::builder("https://api.example.com")
//!         .with_timeout_secs(30)
//!         .with_rate_limit(5.0)
//!         .build()?;
//!     let client = ApiClient::new(config)?;
//!
//!     let body = client.send_request("POST", "/widgets", r#"{"name":"w"}"#).await?;
//!     let id = payload::get_field(&body, "id")?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod object;
pub mod payload;
mod rate_limit;
mod request;
mod response;
mod tls;

pub use client::ApiClient;
pub use config::{
    env, AuthSettings, ClientConfig, ClientConfigBuilder, ClientOptions, JwtOptions,
    OAuthOptions, ObjectAddressing, Operation, DEFAULT_ID_ATTRIBUTE,
};
pub use error::{Error, ErrorKind, Result};
pub use object::{ImportId, RemoteObject};
pub use rate_limit::RateLimiter;
pub use request::{parse_method, RequestBuilder};
pub use response::{strip_xssi_prefix, ResponseEnvelope, EMPTY_OBJECT};
pub use tls::{PemSource, TlsOptions, TlsSettings};

pub use tokio_util::sync::CancellationToken;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("restapi-client/", env!("CARGO_PKG_VERSION"));
