//! # restapi
//!
//! A generic client for managing JSON resources on REST APIs it knows
//! nothing about.
//!
//! ## Security
//!
//! - Sensitive data (secrets, passwords, tokens) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages never carry credential values
//!
//! ## Crates
//!
//! - **restapi-client** - Configuration, TLS, rate limiting, request dispatch, payload helpers
//! - **restapi-auth** - Authorization: HMAC JWT, OAuth 2.0 client credentials, HTTP Basic
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restapi::{ApiClient, ClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options: ClientOptions = serde_json::from_str(r#"{
//!         "uri": "https://api.example.com/",
//!         "rateLimit": 5,
//!         "jwt": {"secret": "s3cr3t", "claims": {"sub": "svc"}, "validityDurationMinutes": 5}
//!     }"#)?;
//!     let client = ApiClient::connect(options.into_config()?).await?;
//!
//!     let object = client.create_object("/widgets", r#"{"name":"w"}"#).await?;
//!     println!("created {}", object.id);
//!
//!     client.delete_object(&object).await?;
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use restapi_auth as auth;
pub use restapi_client as client;

// Re-export commonly used types at the top level
pub use restapi_client::{
    payload, ApiClient, ClientConfig, ClientOptions, Error, ErrorKind, RemoteObject, Result,
};
