//! Single-shot HTTP/1 client.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use http::{HeaderValue, Request, Uri};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::ext::ReasonPhrase;
use hyper_util::rt::TokioIo;
use rustls::ClientConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::dispatch::response::ReceivedResponse;
use crate::net::{connect_plain, connect_tls, ConnectError, Scheme};
use crate::request::ResolvedRequest;

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("HTTP handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("request failed: {0}")]
    Send(#[source] hyper::Error),
}

/// Knobs for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Attach the TLS session summary to the response.
    pub capture_tls: bool,
}

/// Sends one resolved request and returns the response head.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tls_config: Arc<ClientConfig>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(tls_config: Arc<ClientConfig>, options: DispatchOptions) -> Self {
        Self {
            tls_config,
            options,
        }
    }

    /// Perform the exchange. Blocks until response headers arrive.
    pub async fn send(&self, resolved: ResolvedRequest) -> Result<ReceivedResponse, DispatchError> {
        log_resolved(&resolved);

        let host = resolved.host().to_string();
        let port = resolved.port();
        let scheme = resolved.scheme;
        let request = into_hyper_request(resolved);

        match scheme {
            Scheme::Http => {
                let stream = connect_plain(&host, port).await?;
                exchange(stream, request).await
            }
            Scheme::Https => {
                let (stream, summary) = connect_tls(
                    &host,
                    port,
                    self.tls_config.clone(),
                    self.options.capture_tls,
                )
                .await?;
                let mut response = exchange(stream, request).await?;
                response.tls = summary;
                Ok(response)
            }
        }
    }
}

/// Verbose output: the decomposed URL and the full request.
fn log_resolved(resolved: &ResolvedRequest) {
    tracing::debug!(
        url = %resolved.uri,
        scheme = %resolved.scheme,
        host = %resolved.host(),
        port = resolved.port(),
        path = %resolved.uri.path(),
        query = resolved.uri.query().unwrap_or_default(),
        "Resolved URL"
    );
    tracing::debug!("Resolved request:\n{}", resolved);
}

/// Convert to an origin-form hyper request.
///
/// Framing headers from the input are dropped so hyper frames the final body
/// itself; `Host` is filled from the URL only if the request has none.
fn into_hyper_request(resolved: ResolvedRequest) -> Request<Full<Bytes>> {
    let origin_form = Uri::from(resolved.path_and_query());
    let authority = resolved
        .authority()
        .and_then(|a| HeaderValue::from_str(a.as_str()).ok());

    let mut headers = resolved.headers;
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
    if let (false, Some(authority)) = (headers.contains_key(HOST), authority) {
        headers.insert(HOST, authority);
    }

    let mut request = Request::new(Full::new(resolved.body));
    *request.method_mut() = resolved.method;
    *request.uri_mut() = origin_form;
    *request.version_mut() = resolved.version;
    *request.headers_mut() = headers;
    request
}

async fn exchange<S>(
    stream: S,
    request: Request<Full<Bytes>>,
) -> Result<ReceivedResponse, DispatchError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = http1::Builder::new()
        .title_case_headers(true)
        .handshake(TokioIo::new(stream))
        .await
        .map_err(DispatchError::Handshake)?;

    // Drives the connection until the body has been read or dropped.
    tokio::spawn(async move {
        if let Err(err) = conn.await {
            tracing::debug!(error = %err, "Connection finished with error");
        }
    });

    let method = request.method().clone();
    let response = sender
        .send_request(request)
        .await
        .map_err(DispatchError::Send)?;

    tracing::debug!(
        status = %response.status(),
        version = ?response.version(),
        "Response headers received"
    );

    let (parts, body): (_, Incoming) = response.into_parts();
    let mut received = ReceivedResponse::new(parts.status, parts.version, parts.headers, body);
    received.reason = parts
        .extensions
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned());
    received.request_method = method;
    Ok(received)
}
