//! Client configuration.
//!
//! Options are collected by [`ClientConfigBuilder`] (or deserialized into
//! [`ClientOptions`]) and resolved once by `build()`, which validates every
//! value and applies the defaults below. The resulting [`ClientConfig`] is
//! never modified afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use restapi_auth::{BasicCredentials, ClientCredentialsConfig, HmacAlgorithm, HmacJwt};
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::tls::{PemSource, TlsOptions, TlsSettings};

/// Default identifier field.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Default HTTP verb per operation.
const DEFAULT_METHODS: [(Operation, &str); 4] = [
    (Operation::Create, "POST"),
    (Operation::Read, "GET"),
    (Operation::Update, "PUT"),
    (Operation::Destroy, "DELETE"),
];

/// Environment variables consulted by [`ClientConfigBuilder::from_env`].
pub mod env {
    pub const URI: &str = "REST_API_URI";
    pub const JWT_SECRET: &str = "REST_API_JWT_SECRET";
    pub const TIMEOUT: &str = "REST_API_TIMEOUT";
    pub const ID_ATTRIBUTE: &str = "REST_API_ID_ATTRIBUTE";
    pub const CREATE_METHOD: &str = "REST_API_CREATE_METHOD";
    pub const READ_METHOD: &str = "REST_API_READ_METHOD";
    pub const UPDATE_METHOD: &str = "REST_API_UPDATE_METHOD";
    pub const DESTROY_METHOD: &str = "REST_API_DESTROY_METHOD";
    pub const WRITE_RETURNS_OBJECT: &str = "REST_API_WRO";
    pub const CREATE_RETURNS_OBJECT: &str = "REST_API_CRO";
    pub const TEST_PATH: &str = "REST_API_TEST_PATH";
    pub const DEBUG: &str = "REST_API_DEBUG";
}

/// The four object operations, each with its own configurable verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Destroy,
}

impl Operation {
    /// The verb used when none is configured.
    pub fn default_method(self) -> &'static str {
        DEFAULT_METHODS
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, method)| *method)
            .unwrap_or("GET")
    }

    fn env_var(self) -> &'static str {
        match self {
            Operation::Create => env::CREATE_METHOD,
            Operation::Read => env::READ_METHOD,
            Operation::Update => env::UPDATE_METHOD,
            Operation::Destroy => env::DESTROY_METHOD,
        }
    }
}

/// How an object's address is derived from its collection path and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ObjectAddressing {
    /// `<path>/<id>`
    #[default]
    PathSuffix,
    /// `<path>?<param>=<id>`
    Query(String),
}

impl ObjectAddressing {
    /// Build the address of one object.
    pub fn object_path(&self, path: &str, id: &str) -> String {
        let base = path.trim_end_matches('/');
        match self {
            ObjectAddressing::PathSuffix => format!("{}/{}", base, id),
            ObjectAddressing::Query(param) => {
                format!("{}?{}={}", base, param, urlencoding::encode(id))
            }
        }
    }
}

/// JWT options as supplied by the caller.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtOptions {
    /// HMAC secret.
    #[serde(default)]
    pub secret: String,
    /// `HS256`, `HS384` or `HS512`; defaults to `HS256`.
    #[serde(default)]
    pub algorithm: Option<String>,
    /// Claims template: a JSON object, or a string holding one.
    #[serde(default)]
    pub claims: serde_json::Value,
    /// When positive, `nbf`/`iat`/`exp` are completed on every signature.
    #[serde(default)]
    pub validity_duration_minutes: Option<i64>,
}

impl std::fmt::Debug for JwtOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtOptions")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("claims", &self.claims)
            .field("validity_duration_minutes", &self.validity_duration_minutes)
            .finish()
    }
}

impl JwtOptions {
    fn resolve(&self) -> Result<HmacJwt> {
        let algorithm = self
            .algorithm
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| HmacAlgorithm::default().as_str().to_string());
        let secret = self.secret.as_bytes().to_vec();

        let jwt = match &self.claims {
            serde_json::Value::String(claims_json) => {
                HmacJwt::from_claims_json(secret, algorithm, claims_json)?
            }
            serde_json::Value::Object(_) => HmacJwt::new(secret, algorithm, self.claims.clone())?,
            serde_json::Value::Null => {
                HmacJwt::new(secret, algorithm, serde_json::Value::Object(Default::default()))?
            }
            _ => return Err(Error::config("JWT claims must be a JSON object")),
        };

        Ok(match self.validity_duration_minutes {
            Some(minutes) => jwt.with_validity_minutes(minutes),
            None => jwt,
        })
    }
}

/// OAuth2 client-credentials options as supplied by the caller.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthOptions {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default, rename = "tokenURL", alias = "tokenUrl")]
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub endpoint_params: BTreeMap<String, Vec<String>>,
}

impl std::fmt::Debug for OAuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthOptions")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("endpoint_params", &self.endpoint_params)
            .finish()
    }
}

impl OAuthOptions {
    fn resolve(&self) -> Result<ClientCredentialsConfig> {
        if self.token_url.is_empty() {
            return Err(Error::config("OAuth2 token URL is required"));
        }
        Ok(
            ClientCredentialsConfig::new(&self.client_id, &self.client_secret, &self.token_url)?
                .with_scopes(self.scopes.clone())
                .with_endpoint_params(self.endpoint_params.clone()),
        )
    }
}

/// Authorization material resolved from the options.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub jwt: Option<HmacJwt>,
    pub oauth: Option<ClientCredentialsConfig>,
    pub basic: Option<BasicCredentials>,
}

/// Validated, immutable client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URI without trailing slash.
    pub uri: String,
    /// Headers set on every request.
    pub headers: HeaderMap,
    /// Per-request deadline; `None` disables it.
    pub timeout: Option<Duration>,
    /// Identifier field, possibly a `/`-delimited path.
    pub id_attribute: String,
    pub create_method: Method,
    pub read_method: Method,
    pub update_method: Method,
    pub destroy_method: Method,
    /// Body sent with object reads.
    pub read_data: Option<String>,
    /// Body sent with object deletes.
    pub destroy_data: Option<String>,
    /// Fields copied from known state into update bodies.
    pub copy_keys: Vec<String>,
    pub write_returns_object: bool,
    pub create_returns_object: bool,
    /// Stripped from the start of every response body.
    pub xssi_prefix: String,
    /// Keep a cookie jar for the lifetime of the client.
    pub use_cookies: bool,
    /// Requests per second; `None` means unlimited.
    pub rate_limit: Option<f64>,
    pub addressing: ObjectAddressing,
    pub tls: TlsSettings,
    pub auth: AuthSettings,
    /// Requested with the read verb when the client is connected.
    pub test_path: Option<String>,
    /// Verbose request/response tracing.
    pub debug: bool,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.keys().map(|k| k.as_str()).collect();
        f.debug_struct("ClientConfig")
            .field("uri", &self.uri)
            .field("headers", &header_names)
            .field("timeout", &self.timeout)
            .field("id_attribute", &self.id_attribute)
            .field("create_method", &self.create_method)
            .field("read_method", &self.read_method)
            .field("update_method", &self.update_method)
            .field("destroy_method", &self.destroy_method)
            .field("copy_keys", &self.copy_keys)
            .field("write_returns_object", &self.write_returns_object)
            .field("create_returns_object", &self.create_returns_object)
            .field("xssi_prefix", &self.xssi_prefix)
            .field("use_cookies", &self.use_cookies)
            .field("rate_limit", &self.rate_limit)
            .field("addressing", &self.addressing)
            .field("tls", &self.tls)
            .field("auth", &self.auth)
            .field("test_path", &self.test_path)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a new client config builder for the given base URI.
    pub fn builder(uri: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            uri: Some(uri.into()),
            ..Default::default()
        }
    }

    /// The verb configured for an operation.
    pub fn method_for(&self, op: Operation) -> &Method {
        match op {
            Operation::Create => &self.create_method,
            Operation::Read => &self.read_method,
            Operation::Update => &self.update_method,
            Operation::Destroy => &self.destroy_method,
        }
    }

    /// Whether the response of `op` is the authoritative object state, making
    /// a follow-up read unnecessary.
    pub fn returns_object(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create_returns_object || self.write_returns_object,
            Operation::Update => self.write_returns_object,
            Operation::Read => true,
            Operation::Destroy => false,
        }
    }
}

/// Builder for ClientConfig.
#[derive(Default, Clone)]
pub struct ClientConfigBuilder {
    uri: Option<String>,
    headers: BTreeMap<String, String>,
    timeout_secs: Option<u64>,
    id_attribute: Option<String>,
    methods: BTreeMap<Operation, String>,
    read_data: Option<String>,
    destroy_data: Option<String>,
    copy_keys: Vec<String>,
    write_returns_object: Option<bool>,
    create_returns_object: Option<bool>,
    xssi_prefix: Option<String>,
    use_cookies: bool,
    rate_limit: Option<f64>,
    addressing: ObjectAddressing,
    tls: TlsOptions,
    username: Option<String>,
    password: Option<String>,
    jwt: Option<JwtOptions>,
    oauth: Option<OAuthOptions>,
    test_path: Option<String>,
    debug: Option<bool>,
}

impl std::fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("uri", &self.uri)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("jwt", &self.jwt)
            .field("oauth", &self.oauth)
            .finish_non_exhaustive()
    }
}

impl ClientConfigBuilder {
    /// Create a builder with no URI; it must come from options or the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URI.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add a header sent on every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all static headers.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the per-request timeout in seconds; 0 disables it.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the identifier field.
    pub fn with_id_attribute(mut self, id_attribute: impl Into<String>) -> Self {
        self.id_attribute = Some(id_attribute.into());
        self
    }

    /// Set the verb for an operation.
    pub fn with_method(mut self, op: Operation, method: impl Into<String>) -> Self {
        self.methods.insert(op, method.into());
        self
    }

    /// Set the body sent with object reads.
    pub fn with_read_data(mut self, data: impl Into<String>) -> Self {
        self.read_data = Some(data.into());
        self
    }

    /// Set the body sent with object deletes.
    pub fn with_destroy_data(mut self, data: impl Into<String>) -> Self {
        self.destroy_data = Some(data.into());
        self
    }

    /// Set the copy keys.
    pub fn with_copy_keys(mut self, keys: Vec<String>) -> Self {
        self.copy_keys = keys;
        self
    }

    /// Whether write responses contain the full object.
    pub fn with_write_returns_object(mut self, enabled: bool) -> Self {
        self.write_returns_object = Some(enabled);
        self
    }

    /// Whether create responses contain the full object.
    pub fn with_create_returns_object(mut self, enabled: bool) -> Self {
        self.create_returns_object = Some(enabled);
        self
    }

    /// Set the XSSI prefix stripped from responses.
    pub fn with_xssi_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.xssi_prefix = Some(prefix.into());
        self
    }

    /// Keep cookies across requests.
    pub fn with_cookies(mut self, enabled: bool) -> Self {
        self.use_cookies = enabled;
        self
    }

    /// Limit requests per second.
    pub fn with_rate_limit(mut self, per_second: f64) -> Self {
        self.rate_limit = Some(per_second);
        self
    }

    /// Set how object addresses are derived.
    pub fn with_addressing(mut self, addressing: ObjectAddressing) -> Self {
        self.addressing = addressing;
        self
    }

    /// Skip server certificate verification.
    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.tls.insecure_skip_verify = insecure;
        self
    }

    /// Client certificate and key from files.
    pub fn with_client_cert_files(
        mut self,
        cert_file: impl Into<PathBuf>,
        key_file: impl Into<PathBuf>,
    ) -> Self {
        self.tls.client_identity = Some((
            PemSource::File(cert_file.into()),
            PemSource::File(key_file.into()),
        ));
        self
    }

    /// Client certificate and key as inline PEM.
    pub fn with_client_cert_pem(
        mut self,
        cert: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.tls.client_identity = Some((PemSource::Inline(cert.into()), PemSource::Inline(key.into())));
        self
    }

    /// Trusted root CA from a file.
    pub fn with_root_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls.root_ca = Some(PemSource::File(path.into()));
        self
    }

    /// Trusted root CA as inline PEM.
    pub fn with_root_ca_pem(mut self, pem: impl Into<String>) -> Self {
        self.tls.root_ca = Some(PemSource::Inline(pem.into()));
        self
    }

    /// HTTP Basic credentials; ignored unless both are non-empty.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sign a JWT for every request.
    pub fn with_jwt(mut self, jwt: JwtOptions) -> Self {
        self.jwt = Some(jwt);
        self
    }

    /// Fetch bearer tokens with the client-credentials grant.
    pub fn with_oauth(mut self, oauth: OAuthOptions) -> Self {
        self.oauth = Some(oauth);
        self
    }

    /// Request this path with the read verb when connecting.
    pub fn with_test_path(mut self, path: impl Into<String>) -> Self {
        self.test_path = Some(path.into());
        self
    }

    /// Enable verbose request/response tracing.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Fill every option that was not set explicitly from the `REST_API_*`
    /// environment variables.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_env(self) -> Result<Self> {
        self.fill_from(|name| std::env::var(name).ok())
    }

    fn fill_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if self.uri.as_deref().map_or(true, str::is_empty) {
            self.uri = lookup(env::URI);
        }
        if let Some(jwt) = self.jwt.as_mut() {
            if jwt.secret.is_empty() {
                jwt.secret = lookup(env::JWT_SECRET).unwrap_or_default();
            }
        }
        if self.timeout_secs.is_none() {
            self.timeout_secs = lookup(env::TIMEOUT)
                .map(|v| parse_env(env::TIMEOUT, &v))
                .transpose()?;
        }
        if self.id_attribute.is_none() {
            self.id_attribute = lookup(env::ID_ATTRIBUTE);
        }
        for op in [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Destroy,
        ] {
            if !self.methods.contains_key(&op) {
                if let Some(method) = lookup(op.env_var()) {
                    self.methods.insert(op, method);
                }
            }
        }
        if self.write_returns_object.is_none() {
            self.write_returns_object = lookup(env::WRITE_RETURNS_OBJECT)
                .map(|v| parse_env(env::WRITE_RETURNS_OBJECT, &v))
                .transpose()?;
        }
        if self.create_returns_object.is_none() {
            self.create_returns_object = lookup(env::CREATE_RETURNS_OBJECT)
                .map(|v| parse_env(env::CREATE_RETURNS_OBJECT, &v))
                .transpose()?;
        }
        if self.test_path.is_none() {
            self.test_path = lookup(env::TEST_PATH);
        }
        if self.debug.is_none() {
            self.debug = lookup(env::DEBUG)
                .map(|v| parse_env(env::DEBUG, &v))
                .transpose()?;
        }

        Ok(self)
    }

    /// Validate the options and apply defaults.
    pub fn build(self) -> Result<ClientConfig> {
        let uri = resolve_uri(self.uri.as_deref().unwrap_or_default())?;
        let headers = resolve_headers(&self.headers)?;

        let method = |op: Operation| -> Result<Method> {
            let name = self
                .methods
                .get(&op)
                .map(String::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(op.default_method());
            Method::from_bytes(name.as_bytes())
                .map_err(|_| Error::config(format!("invalid HTTP method '{}'", name)))
        };

        if let Some(rate) = self.rate_limit {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(Error::config(format!(
                    "rate limit must be a positive number of requests per second, got {}",
                    rate
                )));
            }
        }

        let id_attribute = self
            .id_attribute
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ID_ATTRIBUTE.to_string());

        let basic = match (self.username.as_deref(), self.password.as_deref()) {
            (None, None) => None,
            (username, password) => {
                let basic = BasicCredentials::new(
                    username.unwrap_or_default(),
                    password.unwrap_or_default(),
                );
                if basic.is_none() {
                    warn!("Basic auth needs both a username and a password; ignoring it");
                }
                basic
            }
        };

        let auth = AuthSettings {
            jwt: self.jwt.as_ref().map(JwtOptions::resolve).transpose()?,
            oauth: self.oauth.as_ref().map(OAuthOptions::resolve).transpose()?,
            basic,
        };

        Ok(ClientConfig {
            uri,
            headers,
            timeout: self
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            id_attribute,
            create_method: method(Operation::Create)?,
            read_method: method(Operation::Read)?,
            update_method: method(Operation::Update)?,
            destroy_method: method(Operation::Destroy)?,
            read_data: self.read_data.clone().filter(|d| !d.is_empty()),
            destroy_data: self.destroy_data.clone().filter(|d| !d.is_empty()),
            copy_keys: self.copy_keys.clone(),
            write_returns_object: self.write_returns_object.unwrap_or(false),
            create_returns_object: self.create_returns_object.unwrap_or(false),
            xssi_prefix: self.xssi_prefix.clone().unwrap_or_default(),
            use_cookies: self.use_cookies,
            rate_limit: self.rate_limit,
            addressing: self.addressing.clone(),
            tls: TlsSettings::load(&self.tls)?,
            auth,
            test_path: self.test_path.clone().filter(|p| !p.is_empty()),
            debug: self.debug.unwrap_or(false),
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("invalid value '{}' for {}", value, name)))
}

fn resolve_uri(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::config("uri must be set to construct an API client"));
    }

    let lower = raw.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(Error::config(format!(
            "uri must be in http(s):// format, got '{}'",
            raw
        )));
    }
    url::Url::parse(raw)?;

    Ok(raw.trim_end_matches('/').to_string())
}

fn resolve_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::config(format!("invalid header name '{}'", name)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| Error::config(format!("invalid value for header '{}'", name)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Flat construction options, as found in configuration documents.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    pub uri: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub use_cookies: bool,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub id_attribute: Option<String>,
    #[serde(default)]
    pub create_method: Option<String>,
    #[serde(default)]
    pub read_method: Option<String>,
    #[serde(default)]
    pub update_method: Option<String>,
    #[serde(default)]
    pub destroy_method: Option<String>,
    #[serde(default)]
    pub read_data: Option<String>,
    #[serde(default)]
    pub destroy_data: Option<String>,
    #[serde(default)]
    pub copy_keys: Vec<String>,
    #[serde(default)]
    pub write_returns_object: bool,
    #[serde(default)]
    pub create_returns_object: bool,
    #[serde(default)]
    pub xssi_prefix: Option<String>,
    #[serde(default)]
    pub rate_limit: Option<f64>,
    #[serde(default)]
    pub oauth: Option<OAuthOptions>,
    #[serde(default)]
    pub cert_file: Option<PathBuf>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub cert_string: Option<String>,
    #[serde(default)]
    pub key_string: Option<String>,
    #[serde(default)]
    pub root_ca_file: Option<PathBuf>,
    #[serde(default)]
    pub root_ca_string: Option<String>,
    #[serde(default)]
    pub jwt: Option<JwtOptions>,
    #[serde(default)]
    pub test_path: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("jwt", &self.jwt)
            .field("oauth", &self.oauth)
            .finish_non_exhaustive()
    }
}

impl ClientOptions {
    /// Convert the flat options into a builder.
    pub fn into_builder(self) -> Result<ClientConfigBuilder> {
        if self.cert_string.is_some() != self.key_string.is_some() {
            return Err(Error::config("certString and keyString must be set together"));
        }
        if self.cert_file.is_some() != self.key_file.is_some() {
            return Err(Error::config("certFile and keyFile must be set together"));
        }

        let mut builder = ClientConfig::builder(self.uri)
            .with_headers(self.headers)
            .with_insecure_skip_verify(self.insecure_skip_verify)
            .with_cookies(self.use_cookies)
            .with_copy_keys(self.copy_keys)
            .with_write_returns_object(self.write_returns_object)
            .with_create_returns_object(self.create_returns_object)
            .with_debug(self.debug);

        if let Some(secs) = self.timeout_seconds {
            builder = builder.with_timeout_secs(secs);
        }
        if let Some(id_attribute) = self.id_attribute {
            builder = builder.with_id_attribute(id_attribute);
        }
        for (op, method) in [
            (Operation::Create, self.create_method),
            (Operation::Read, self.read_method),
            (Operation::Update, self.update_method),
            (Operation::Destroy, self.destroy_method),
        ] {
            if let Some(method) = method {
                builder = builder.with_method(op, method);
            }
        }
        if let Some(data) = self.read_data {
            builder = builder.with_read_data(data);
        }
        if let Some(data) = self.destroy_data {
            builder = builder.with_destroy_data(data);
        }
        if let Some(prefix) = self.xssi_prefix {
            builder = builder.with_xssi_prefix(prefix);
        }
        if let Some(rate) = self.rate_limit {
            builder = builder.with_rate_limit(rate);
        }
        if self.username.is_some() || self.password.is_some() {
            builder = builder.with_basic_auth(
                self.username.unwrap_or_default(),
                self.password.unwrap_or_default(),
            );
        }
        if let Some(oauth) = self.oauth {
            builder = builder.with_oauth(oauth);
        }
        if let Some(jwt) = self.jwt {
            builder = builder.with_jwt(jwt);
        }
        // Files are applied after inline material and win when both are set.
        if let (Some(cert), Some(key)) = (self.cert_string, self.key_string) {
            builder = builder.with_client_cert_pem(cert, key);
        }
        if let (Some(cert), Some(key)) = (self.cert_file, self.key_file) {
            builder = builder.with_client_cert_files(cert, key);
        }
        if let Some(pem) = self.root_ca_string {
            builder = builder.with_root_ca_pem(pem);
        }
        if let Some(path) = self.root_ca_file {
            builder = builder.with_root_ca_file(path);
        }
        if let Some(path) = self.test_path {
            builder = builder.with_test_path(path);
        }

        Ok(builder)
    }

    /// Resolve into a validated configuration.
    pub fn into_config(self) -> Result<ClientConfig> {
        self.into_builder()?.build()
    }
}
