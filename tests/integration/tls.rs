//! HTTPS handshakes against a local server whose certificate chains to a
//! private root CA.

use std::path::PathBuf;
use std::sync::Arc;

use restapi::client::ClientConfigBuilder;
use restapi::ClientConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls;
use tokio_rustls::rustls::pki_types::pem::PemObject;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::TlsAcceptor;

use super::common::{client, init_tracing};

const BODY: &str = r#"{"secure":true}"#;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("crates/api-client/tests/fixtures")
        .join(name)
}

fn provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()))
}

fn certs(name: &str) -> Vec<CertificateDer<'static>> {
    CertificateDer::pem_file_iter(fixture(name))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn server_config(require_client_cert: bool) -> rustls::ServerConfig {
    let builder = rustls::ServerConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()
        .unwrap();

    let builder = if require_client_cert {
        let mut roots = rustls::RootCertStore::empty();
        for ca in certs("ca.pem") {
            roots.add(ca).unwrap();
        }
        let verifier =
            rustls::server::WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider())
                .build()
                .unwrap();
        builder.with_client_cert_verifier(verifier)
    } else {
        builder.with_no_client_auth()
    };

    let key = PrivateKeyDer::from_pem_file(fixture("server.key")).unwrap();
    builder.with_single_cert(certs("server.crt"), key).unwrap()
}

/// Start an HTTPS server answering every request with [`BODY`]; returns its base URI.
async fn serve(require_client_cert: bool) -> String {
    init_tracing();
    let acceptor = TlsAcceptor::from(Arc::new(server_config(require_client_cert)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Failed handshakes just drop the connection.
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    BODY.len(),
                    BODY
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    format!("https://127.0.0.1:{}", port)
}

fn https(uri: &str) -> ClientConfigBuilder {
    ClientConfig::builder(uri)
}

#[tokio::test]
async fn test_private_root_ca_verifies_server() {
    let uri = serve(false).await;
    let api = client(https(&uri).with_root_ca_file(fixture("ca.pem")));

    let body = api.send_request("GET", "/secure", "").await.unwrap();
    assert_eq!(body, BODY);
}

#[tokio::test]
async fn test_inline_root_ca_verifies_server() {
    let uri = serve(false).await;
    let ca = std::fs::read_to_string(fixture("ca.pem")).unwrap();
    let api = client(https(&uri).with_root_ca_pem(ca));

    assert_eq!(api.send_request("GET", "/secure", "").await.unwrap(), BODY);
}

#[tokio::test]
async fn test_unknown_issuer_is_rejected_without_root_ca() {
    let uri = serve(false).await;
    let api = client(https(&uri));

    let err = api.send_request("GET", "/secure", "").await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_insecure_skip_verify_accepts_unknown_issuer() {
    let uri = serve(false).await;
    let api = client(https(&uri).with_insecure_skip_verify(true));

    assert_eq!(api.send_request("GET", "/secure", "").await.unwrap(), BODY);
}

#[tokio::test]
async fn test_client_identity_is_presented() {
    let uri = serve(true).await;
    let api = client(
        https(&uri)
            .with_root_ca_file(fixture("ca.pem"))
            .with_client_cert_files(fixture("client.crt"), fixture("client.key")),
    );

    assert_eq!(api.send_request("GET", "/secure", "").await.unwrap(), BODY);
}

#[tokio::test]
async fn test_mutual_tls_server_rejects_anonymous_client() {
    let uri = serve(true).await;
    let api = client(https(&uri).with_root_ca_file(fixture("ca.pem")));

    let err = api.send_request("GET", "/secure", "").await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
}
