//! TLS material for server verification and client identity.
//!
//! Certificates and keys may come from files or inline PEM strings. All
//! material is loaded and parsed when the configuration is built, so
//! malformed input fails construction rather than the first handshake.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Where a piece of PEM material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PemSource {
    /// Read from a file at build time.
    File(PathBuf),
    /// Inline PEM text.
    Inline(String),
}

impl PemSource {
    fn describe(&self) -> String {
        match self {
            PemSource::File(path) => format!("file {}", path.display()),
            PemSource::Inline(_) => "inline string".to_string(),
        }
    }

    fn load(&self, what: &str) -> Result<Vec<u8>> {
        match self {
            PemSource::File(path) => {
                debug!(path = %path.display(), "Reading {}", what);
                std::fs::read(path).map_err(|e| {
                    Error::with_source(
                        crate::error::ErrorKind::Configuration(format!(
                            "could not read {} {}: {}",
                            what,
                            path.display(),
                            e
                        )),
                        e,
                    )
                })
            }
            PemSource::Inline(pem) => Ok(pem.as_bytes().to_vec()),
        }
    }
}

/// Unparsed TLS options as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Skip server certificate verification.
    pub insecure_skip_verify: bool,
    /// Client certificate and private key for mutual TLS.
    pub client_identity: Option<(PemSource, PemSource)>,
    /// Trusted root CA bundle replacing the built-in roots.
    pub root_ca: Option<PemSource>,
}

/// Parsed TLS material ready to be applied to the HTTP client.
#[derive(Clone, Default)]
pub struct TlsSettings {
    pub(crate) insecure_skip_verify: bool,
    pub(crate) identity: Option<reqwest::Identity>,
    pub(crate) root_certs: Vec<reqwest::Certificate>,
}

impl std::fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsSettings")
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("client_identity", &self.identity.as_ref().map(|_| "[REDACTED]"))
            .field("root_certs", &self.root_certs.len())
            .finish()
    }
}

impl TlsSettings {
    /// Load and parse the configured material.
    pub fn load(options: &TlsOptions) -> Result<Self> {
        let identity = match &options.client_identity {
            Some((cert, key)) => Some(load_identity(cert, key)?),
            None => None,
        };

        let root_certs = match &options.root_ca {
            Some(source) => load_root_ca(source)?,
            None => Vec::new(),
        };

        Ok(Self {
            insecure_skip_verify: options.insecure_skip_verify,
            identity,
            root_certs,
        })
    }

    /// Whether a client certificate is configured.
    pub fn has_client_identity(&self) -> bool {
        self.identity.is_some()
    }

    /// Number of trusted root certificates replacing the built-in roots.
    pub fn root_cert_count(&self) -> usize {
        self.root_certs.len()
    }

    /// Apply the settings to a reqwest client builder.
    pub(crate) fn apply(&self, mut builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        builder = builder.danger_accept_invalid_certs(self.insecure_skip_verify);

        if let Some(identity) = &self.identity {
            builder = builder.identity(identity.clone());
        }

        if !self.root_certs.is_empty() {
            builder = builder.tls_built_in_root_certs(false);
            for cert in &self.root_certs {
                builder = builder.add_root_certificate(cert.clone());
            }
        }

        builder
    }
}

fn load_identity(cert: &PemSource, key: &PemSource) -> Result<reqwest::Identity> {
    let mut pem = key.load("client key")?;
    pem.push(b'\n');
    pem.extend(cert.load("client certificate")?);

    reqwest::Identity::from_pem(&pem).map_err(|e| {
        Error::with_source(
            crate::error::ErrorKind::Configuration(format!(
                "invalid client certificate/key pair ({} / {}): {}",
                cert.describe(),
                key.describe(),
                e
            )),
            e,
        )
    })
}

fn load_root_ca(source: &PemSource) -> Result<Vec<reqwest::Certificate>> {
    let pem = source.load("root CA")?;
    let certs = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
        Error::with_source(
            crate::error::ErrorKind::Configuration(format!(
                "invalid root CA material ({}): {}",
                source.describe(),
                e
            )),
            e,
        )
    })?;

    if certs.is_empty() {
        return Err(Error::config(format!(
            "failed to append root CA certificate from {}",
            source.describe()
        )));
    }

    Ok(certs)
}
