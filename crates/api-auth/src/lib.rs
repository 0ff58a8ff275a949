//! # restapi-auth
//!
//! Authorization schemes for the restapi client.
//!
//! ## Security
//!
//! - Sensitive data (secrets, passwords, tokens) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages never carry credential values
//!
//! ## Supported Schemes
//!
//! - **HMAC JWT** - A token signed per request with HS256/HS384/HS512
//! - **OAuth 2.0 Client Credentials** - Access tokens fetched and cached from a token endpoint
//! - **HTTP Basic** - Always takes final precedence when configured
//!
//! ## Example
//!
//! ```rust,ignore
//! use restapi_auth::{Authenticator, BasicCredentials, HmacJwt};
//!
//! let jwt = HmacJwt::from_claims_json("secret", "HS256", r#"{"sub":"svc"}"#)?
//!     .with_validity_minutes(5);
//! let auth = Authenticator::resolve(Some(jwt), None, None);
//!
//! let header = auth.authorization().await?;
//! ```

mod authenticator;
mod credentials;
mod error;
mod jwt;
mod oauth;

pub use authenticator::{AuthMethod, Authenticator};
pub use credentials::BasicCredentials;
pub use error::{Error, ErrorKind, Result};
pub use jwt::{HmacAlgorithm, HmacJwt};
pub use oauth::{ClientCredentials, ClientCredentialsConfig};
