//! Request materialization.
//!
//! # Responsibilities
//! - Resolve the absolute URL from scheme, host and the original target
//! - Replace overridden headers wholesale; leave the rest untouched
//! - Merge query overrides
//! - Swap in the replacement body, decoding base64 when asked
//!
//! # Design Decisions
//! - The original body is discarded, never consulted, when a substitute exists
//! - Framing is recomputed by the transport from the final body

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use http::uri::{Authority, PathAndQuery};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use thiserror::Error;

use crate::net::Scheme;
use crate::overrides::OverrideSet;
use crate::request::parser::RawRequest;
use crate::request::query::apply_query_overrides;

/// Path bytes the request parser lets through but `http::uri` refuses.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Query bytes the request parser lets through but `http::uri` refuses.
const QUERY_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>');

/// Failures turning a raw request into a dispatchable one.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("request has no Host header or absolute target")]
    MissingHost,

    #[error("invalid host {0:?}")]
    InvalidHost(String),

    #[error("invalid header override name {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid value for header override {0:?}")]
    InvalidHeaderValue(String),

    #[error("could not build request URL: {0}")]
    InvalidUrl(#[from] http::Error),

    #[error("could not base64-decode body: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Replacement request body as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySubstitute {
    Literal(String),
    Base64(String),
}

impl BodySubstitute {
    pub fn new(text: String, is_base64: bool) -> Self {
        if is_base64 {
            Self::Base64(text)
        } else {
            Self::Literal(text)
        }
    }

    /// Bytes to send.
    pub fn decode(&self) -> Result<Bytes, MaterializeError> {
        match self {
            Self::Literal(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Self::Base64(text) => Ok(Bytes::from(STANDARD.decode(text.trim())?)),
        }
    }
}

/// A self-contained request, ready to dispatch.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub method: Method,
    /// Absolute URL: scheme, host and path + query.
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub scheme: Scheme,
}

impl ResolvedRequest {
    /// Host without port or IPv6 brackets.
    pub fn host(&self) -> &str {
        self.uri
            .host()
            .unwrap_or_default()
            .trim_start_matches('[')
            .trim_end_matches(']')
    }

    /// Explicit port, else the scheme default.
    pub fn port(&self) -> u16 {
        self.uri
            .port_u16()
            .unwrap_or_else(|| self.scheme.default_port())
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.uri.authority()
    }

    pub fn path_and_query(&self) -> PathAndQuery {
        self.uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"))
    }
}

/// Wire-like rendering used for verbose diagnostics.
impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {:?}", self.method, self.uri, self.version)?;
        for (name, value) in &self.headers {
            writeln!(f, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
        }
        write!(f, "\n<{} byte body>", self.body.len())
    }
}

/// Apply overrides, scheme and body substitute to a parsed request.
pub fn materialize(
    raw: RawRequest,
    overrides: &OverrideSet,
    scheme: Scheme,
    body: Option<&BodySubstitute>,
) -> Result<ResolvedRequest, MaterializeError> {
    let host = raw.host.as_deref().ok_or(MaterializeError::MissingHost)?;
    let authority: Authority = host
        .parse()
        .map_err(|_| MaterializeError::InvalidHost(host.to_string()))?;

    // Existing escapes are kept; `%` is never re-encoded.
    let path = utf8_percent_encode(raw.path(), PATH_ESCAPES);
    let query = apply_query_overrides(raw.query(), overrides.queries());
    let path_and_query = match query {
        Some(query) if !query.is_empty() => {
            format!("{}?{}", path, utf8_percent_encode(&query, QUERY_ESCAPES))
        }
        _ => path.to_string(),
    };

    let uri = Uri::builder()
        .scheme(scheme.as_str())
        .authority(authority)
        .path_and_query(path_and_query)
        .build()?;

    let mut headers = raw.headers;
    for (key, value) in overrides.headers() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| MaterializeError::InvalidHeaderName(key.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| MaterializeError::InvalidHeaderValue(key.clone()))?;
        // `insert` drops every previous value for the name.
        headers.insert(name, value);
    }

    let body = match body {
        Some(substitute) => substitute.decode()?,
        None => raw.body,
    };

    Ok(ResolvedRequest {
        method: raw.method,
        uri,
        version: raw.version,
        headers,
        body,
        scheme,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::parser::parse_request;

    const INPUT: &[u8] = b"GET /x?a=1 HTTP/1.1\nHost: example.com\n\n";

    #[test]
    fn test_query_and_header_override() {
        let raw = parse_request(INPUT).unwrap();
        let overrides = OverrideSet::from_args(["a? 2", "X-Test: v"]).unwrap();

        let resolved = materialize(raw, &overrides, Scheme::Http, None).unwrap();
        assert_eq!(resolved.uri, "http://example.com/x?a=2");
        assert_eq!(resolved.headers["x-test"], "v");
        assert_eq!(resolved.headers["host"], "example.com");
        assert_eq!(resolved.host(), "example.com");
        assert_eq!(resolved.port(), 80);
    }

    #[test]
    fn test_base64_body() {
        let raw = parse_request(INPUT).unwrap();
        let body = BodySubstitute::new(STANDARD.encode("hello"), true);

        let resolved =
            materialize(raw, &OverrideSet::default(), Scheme::Https, Some(&body)).unwrap();
        assert_eq!(&resolved.body[..], b"hello");
        assert_eq!(resolved.port(), 443);
    }

    #[test]
    fn test_base64_binary_roundtrip() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let body = BodySubstitute::Base64(STANDARD.encode(&bytes));
        assert_eq!(&body.decode().unwrap()[..], &bytes[..]);
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let raw = parse_request(INPUT).unwrap();
        let body = BodySubstitute::new("not base64!!".into(), true);

        let err = materialize(raw, &OverrideSet::default(), Scheme::Http, Some(&body)).unwrap_err();
        assert!(matches!(err, MaterializeError::Encoding(_)));
    }

    #[test]
    fn test_literal_body_replaces_original() {
        let raw = parse_request(
            b"POST /p HTTP/1.1\r\nHost: h\r\nContent-Length: 8\r\n\r\noriginal",
        )
        .unwrap();
        let body = BodySubstitute::new("new".into(), false);

        let resolved = materialize(raw, &OverrideSet::default(), Scheme::Http, Some(&body)).unwrap();
        assert_eq!(&resolved.body[..], b"new");
    }

    #[test]
    fn test_original_body_passes_through() {
        let raw = parse_request(
            b"POST /p HTTP/1.1\r\nHost: h\r\nContent-Length: 8\r\n\r\noriginal",
        )
        .unwrap();

        let resolved = materialize(raw, &OverrideSet::default(), Scheme::Http, None).unwrap();
        assert_eq!(&resolved.body[..], b"original");
        assert_eq!(resolved.uri, "http://h/p");
    }

    #[test]
    fn test_unsafe_target_bytes_are_escaped() {
        let raw = parse_request(b"GET /a<b>?q=<script>&r=%3C HTTP/1.1\r\nHost: h\r\n\r\n").unwrap();

        let resolved = materialize(raw, &OverrideSet::default(), Scheme::Http, None).unwrap();
        assert_eq!(resolved.uri, "http://h/a%3Cb%3E?q=%3Cscript%3E&r=%3C");

        let raw = parse_request(b"GET /s?q=<x> HTTP/1.1\r\nHost: h\r\n\r\n").unwrap();
        let overrides = OverrideSet::from_args(["a? <1>"]).unwrap();
        let resolved = materialize(raw, &overrides, Scheme::Http, None).unwrap();
        assert_eq!(resolved.path_and_query(), "/s?a=%3C1%3E&q=%3Cx%3E");
    }

    #[test]
    fn test_header_override_replaces_all_values() {
        let raw = parse_request(
            b"GET / HTTP/1.1\r\nHost: h\r\nAccept: a\r\nAccept: b\r\nUser-Agent: ua\r\n\r\n",
        )
        .unwrap();
        let overrides = OverrideSet::from_args(["accept: c"]).unwrap();

        let resolved = materialize(raw, &overrides, Scheme::Http, None).unwrap();
        let accept: Vec<_> = resolved.headers.get_all("accept").iter().collect();
        assert_eq!(accept, ["c"]);
        assert_eq!(resolved.headers["user-agent"], "ua");
    }

    #[test]
    fn test_host_override_keeps_url_host() {
        let raw = parse_request(INPUT).unwrap();
        let overrides = OverrideSet::from_args(["Host: virtual.test"]).unwrap();

        let resolved = materialize(raw, &overrides, Scheme::Http, None).unwrap();
        assert_eq!(resolved.host(), "example.com");
        assert_eq!(resolved.headers["host"], "virtual.test");
    }

    #[test]
    fn test_missing_host() {
        let raw = parse_request(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        let err = materialize(raw, &OverrideSet::default(), Scheme::Http, None).unwrap_err();
        assert!(matches!(err, MaterializeError::MissingHost));
    }

    #[test]
    fn test_invalid_header_override() {
        let raw = parse_request(INPUT).unwrap();
        let overrides = OverrideSet::from_args([": empty name"]).unwrap();
        let err = materialize(raw, &overrides, Scheme::Http, None).unwrap_err();
        assert!(matches!(err, MaterializeError::InvalidHeaderName(_)));
    }

    #[test]
    fn test_ipv6_host() {
        let raw = parse_request(b"GET / HTTP/1.1\r\nHost: [::1]:8080\r\n\r\n").unwrap();
        let resolved = materialize(raw, &OverrideSet::default(), Scheme::Http, None).unwrap();
        assert_eq!(resolved.host(), "::1");
        assert_eq!(resolved.port(), 8080);
    }
}
