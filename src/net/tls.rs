//! TLS client configuration and session reporting.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rustls::{ClientConfig, ClientConnection, RootCertStore};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// ALPN identifier for the only protocol the dispatcher speaks.
const ALPN_HTTP1: &[u8] = b"http/1.1";

/// Build the rustls client configuration.
///
/// Trust anchors are the bundled webpki roots plus, optionally, every
/// certificate found in the PEM file at `extra_roots`.
pub fn build_client_config(extra_roots: Option<&Path>) -> Result<Arc<ClientConfig>, std::io::Error> {
    let mut roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if let Some(path) = extra_roots {
        let added = load_pem_roots(path, &mut roots)?;
        tracing::debug!(path = %path.display(), added, "Loaded extra root certificates");
    }

    let mut config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    config.alpn_protocols = vec![ALPN_HTTP1.to_vec()];

    Ok(Arc::new(config))
}

/// Add every certificate in a PEM file to `roots`.
fn load_pem_roots(path: &Path, roots: &mut RootCertStore) -> Result<usize, std::io::Error> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("CA file not found: {:?}", path),
        ));
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut added = 0;
    for cert in rustls_pemfile::certs(&mut reader) {
        roots
            .add(cert?)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        added += 1;
    }
    Ok(added)
}

/// Summary of a negotiated TLS session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsSummary {
    /// e.g. `TLSv1_3`.
    pub version: Option<String>,
    /// e.g. `TLS13_AES_128_GCM_SHA256`.
    pub cipher_suite: Option<String>,
    /// ALPN protocol agreed with the server.
    pub negotiated_protocol: Option<String>,
    /// Name sent in SNI and verified against the certificate.
    pub server_name: String,
    pub handshake_complete: bool,
    /// Peer chain, leaf first, base64 DER.
    pub peer_certificates: Vec<String>,
}

impl TlsSummary {
    pub fn from_connection(conn: &ClientConnection, server_name: &str) -> Self {
        Self {
            version: conn.protocol_version().map(|v| format!("{:?}", v)),
            cipher_suite: conn
                .negotiated_cipher_suite()
                .map(|suite| format!("{:?}", suite.suite())),
            negotiated_protocol: conn
                .alpn_protocol()
                .map(|p| String::from_utf8_lossy(p).into_owned()),
            server_name: server_name.to_string(),
            handshake_complete: !conn.is_handshaking(),
            peer_certificates: conn
                .peer_certificates()
                .unwrap_or_default()
                .iter()
                .map(|cert| STANDARD.encode(cert.as_ref()))
                .collect(),
        }
    }
}
