//! Outbound connection establishment.
//!
//! # Responsibilities
//! - Resolve and connect TCP to the target host and port
//! - Run the TLS handshake for secure schemes
//! - Capture the TLS session summary when asked to
//!
//! # Design Decisions
//! - Exactly one attempt; no retry, no custom timeout
//! - SNI is taken from the URL host, IP literals included

use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::net::tls::TlsSummary;

/// Failures before any HTTP bytes are exchanged.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not connect to {addr}: {source}")]
    Tcp {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TLS server name {0:?}")]
    ServerName(String),

    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Open a plain TCP connection.
pub async fn connect_plain(host: &str, port: u16) -> Result<TcpStream, ConnectError> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|source| ConnectError::Tcp {
            addr: format!("{}:{}", host, port),
            source,
        })?;

    if let Ok(peer) = stream.peer_addr() {
        tracing::debug!(host = %host, peer = %peer, "TCP connection established");
    }
    Ok(stream)
}

/// Open a TCP connection and secure it.
///
/// Returns the session summary alongside the stream when `capture` is set.
pub async fn connect_tls(
    host: &str,
    port: u16,
    config: Arc<ClientConfig>,
    capture: bool,
) -> Result<(TlsStream<TcpStream>, Option<TlsSummary>), ConnectError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| ConnectError::ServerName(host.to_string()))?;

    let tcp = connect_plain(host, port).await?;
    let stream = TlsConnector::from(config)
        .connect(server_name, tcp)
        .await
        .map_err(|source| ConnectError::Handshake {
            host: host.to_string(),
            source,
        })?;

    let (_, session) = stream.get_ref();
    tracing::debug!(
        host = %host,
        version = ?session.protocol_version(),
        alpn = ?session.alpn_protocol().map(String::from_utf8_lossy),
        "TLS session established"
    );

    let summary = capture.then(|| TlsSummary::from_connection(session, host));
    Ok((stream, summary))
}
